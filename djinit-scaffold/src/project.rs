//! `djinit setup`: lay out a complete Django project.
//!
//! ```text
//! <root>/
//!   manage.py                      (0755)
//!   <module>/__init__.py
//!   <module>/settings/{__init__,base,development,production}.py
//!   <module>/{urls,wsgi,asgi}.py
//!   [<nested_dir>/]<app>/...       (see [`crate::app`])
//!   .gitignore requirements.txt README.md .env.sample
//!   justfile Procfile runtime.txt pyproject.toml .djinit
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use djinit_core::{
    config,
    secret::{generate_secret_key, DEFAULT_KEY_LENGTH},
    types::{AppName, DatabaseType, ProjectSettings, DJANGO_VERSION, PYTHON_VERSION},
    DjinitConfig,
};
use djinit_template::{Context, TemplateEngine};

use crate::app::write_app_files;
use crate::error::ScaffoldError;
use crate::settings;
use crate::writer::{make_executable, write_file, WriteResult};

/// Files inside the configuration module, relative to it.
const CONFIG_FILES: &[(&str, &str)] = &[
    ("settings/base.py", "config/settings/base.py-tpl"),
    ("settings/development.py", "config/settings/development.py-tpl"),
    ("settings/production.py", "config/settings/production.py-tpl"),
    ("urls.py", "config/urls.py-tpl"),
    ("wsgi.py", "config/wsgi.py-tpl"),
    ("asgi.py", "config/asgi.py-tpl"),
];

/// Files at the project root.
const PROJECT_FILES: &[(&str, &str)] = &[
    (".gitignore", "project/gitignore-tpl"),
    ("requirements.txt", "project/requirements-tpl"),
    ("README.md", "project/readme.md-tpl"),
    (".env.sample", "project/env_sample-tpl"),
    ("justfile", "project/justfile-tpl"),
    ("Procfile", "project/procfile-tpl"),
    ("runtime.txt", "project/runtime_txt-tpl"),
    ("pyproject.toml", "project/pyproject.toml-tpl"),
];

const BASE_SETTINGS: &str = "settings/base.py";

// ---------------------------------------------------------------------------
// Template context
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProjectContext<'a> {
    project_name: &'a str,
    module_name: &'a str,
    app_names: Vec<&'a str>,
    app_modules: Vec<String>,
    app_configs: Vec<String>,
    nested_dir: Option<&'a str>,
    use_database_url: bool,
    database_type: DatabaseType,
    secret_key: &'a str,
    package_name: String,
    django_version: &'static str,
    python_version: &'static str,
}

/// Variables every project-level template sees.
pub fn project_context(
    settings: &ProjectSettings,
    secret_key: &str,
) -> Result<Context, ScaffoldError> {
    let ctx = ProjectContext {
        project_name: &settings.project_name.0,
        module_name: &settings.module_name,
        app_names: settings.apps.iter().map(AppName::as_str).collect(),
        app_modules: settings.app_modules(),
        app_configs: settings.app_configs(),
        nested_dir: settings.nested_dir.as_deref(),
        use_database_url: settings.use_database_url,
        database_type: settings.database_type,
        secret_key,
        package_name: settings.package_name(),
        django_version: DJANGO_VERSION,
        python_version: PYTHON_VERSION,
    };
    Ok(Context::from_serialize(&ctx)?)
}

// ---------------------------------------------------------------------------
// Helpers shared with `app`
// ---------------------------------------------------------------------------

/// Render `name` and terminate it with a newline.
pub(crate) fn render_file(
    engine: &TemplateEngine,
    name: &str,
    ctx: &Context,
) -> Result<String, ScaffoldError> {
    let mut content = engine.render_template(name, ctx)?;
    if !content.ends_with('\n') {
        content.push('\n');
    }
    Ok(content)
}

/// Create `<dir>/__init__.py` if missing; an existing one is never touched.
pub(crate) fn ensure_package(dir: &Path, dry_run: bool) -> Result<WriteResult, ScaffoldError> {
    let path = dir.join("__init__.py");
    if path.exists() {
        return Ok(WriteResult::Unchanged { path });
    }
    write_file(&path, "", dry_run)
}

/// Directory apps are created in: `<root>/<nested_dir>` or `<root>`.
pub fn apps_dir(root: &Path, nested_dir: Option<&str>) -> PathBuf {
    match nested_dir.map(|d| d.trim_matches(|c| c == '/' || c == '.')) {
        Some(dir) if !dir.is_empty() => root.join(dir.replace('.', "/")),
        _ => root.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// create_project
// ---------------------------------------------------------------------------

/// Generate every project file under `root`.
///
/// Existing files with identical content are reported `Unchanged`; with
/// `dry_run` nothing is written and the structure check is skipped.
pub fn create_project(
    root: &Path,
    settings: &ProjectSettings,
    engine: &TemplateEngine,
    dry_run: bool,
) -> Result<Vec<WriteResult>, ScaffoldError> {
    let secret_key = generate_secret_key(DEFAULT_KEY_LENGTH);
    let ctx = project_context(settings, &secret_key)?;
    let module_dir = root.join(&settings.module_name);
    let mut writes = Vec::new();

    tracing::info!(
        project = %settings.project_name,
        module = %settings.module_name,
        apps = settings.apps.len(),
        "creating project"
    );

    let manage_py = root.join("manage.py");
    writes.push(write_file(
        &manage_py,
        &render_file(engine, "project/manage.py-tpl", &ctx)?,
        dry_run,
    )?);
    if !dry_run {
        make_executable(&manage_py)?;
    }

    writes.push(ensure_package(&module_dir, dry_run)?);
    writes.push(ensure_package(&module_dir.join("settings"), dry_run)?);
    for (file, template) in CONFIG_FILES {
        let mut content = render_file(engine, template, &ctx)?;
        if *file == BASE_SETTINGS {
            content = register_apps(&content, settings, &module_dir.join(file))?;
        }
        writes.push(write_file(&module_dir.join(file), &content, dry_run)?);
    }

    let app_root = apps_dir(root, settings.nested_dir.as_deref());
    if settings.nested_dir.is_some() && !settings.apps.is_empty() {
        writes.push(ensure_package(&app_root, dry_run)?);
    }
    for app in &settings.apps {
        let module = settings.app_module(app);
        writes.extend(write_app_files(&app_root.join(app.as_str()), app, &module, engine, dry_run)?);
    }

    for (file, template) in PROJECT_FILES {
        let content = render_file(engine, template, &ctx)?;
        writes.push(write_file(&root.join(file), &content, dry_run)?);
    }

    let config = DjinitConfig::from_settings(settings);
    writes.push(write_file(
        &config::config_path(root),
        &config::to_json(&config)?,
        dry_run,
    )?);

    if !dry_run {
        validate_structure(root, settings)?;
    }
    Ok(writes)
}

/// Make sure every app's AppConfig path is listed in `USER_DEFINED_APPS`.
///
/// The bundled `base.py` already lists them; a user override might not.
fn register_apps(
    content: &str,
    settings: &ProjectSettings,
    path: &Path,
) -> Result<String, ScaffoldError> {
    let missing: Vec<String> = settings
        .app_configs()
        .into_iter()
        .filter(|entry| !settings::contains_app(content, entry))
        .collect();
    if missing.is_empty() {
        return Ok(content.to_string());
    }
    tracing::debug!(count = missing.len(), "registering apps in base settings");
    settings::insert_apps(content, &missing).ok_or_else(|| ScaffoldError::AppsListMissing {
        path: path.to_path_buf(),
    })
}

/// Files a usable project must have after generation.
pub fn required_files(root: &Path, settings: &ProjectSettings) -> Vec<PathBuf> {
    let module_dir = root.join(&settings.module_name);
    let mut required = vec![root.join("manage.py"), module_dir.join("__init__.py")];
    required.extend(CONFIG_FILES.iter().map(|(file, _)| module_dir.join(file)));

    let app_root = apps_dir(root, settings.nested_dir.as_deref());
    for app in &settings.apps {
        let app_dir = app_root.join(app.as_str());
        required.push(app_dir.join("apps.py"));
        required.push(app_dir.join("migrations").join("__init__.py"));
    }
    required
}

/// Fail with [`ScaffoldError::MissingFiles`] listing whatever is absent.
pub fn validate_structure(root: &Path, settings: &ProjectSettings) -> Result<(), ScaffoldError> {
    let missing: Vec<PathBuf> = required_files(root, settings)
        .into_iter()
        .filter(|p| !p.is_file())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScaffoldError::MissingFiles(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn settings() -> ProjectSettings {
        let mut settings = ProjectSettings::new("shop");
        settings.module_name = "config".to_string();
        settings.apps = vec![AppName::from("users")];
        settings.nested_dir = Some("apps".to_string());
        settings
    }

    #[test]
    fn context_exposes_derived_names() {
        let ctx = project_context(&settings(), "k").unwrap();
        assert_eq!(ctx.get("app_modules"), Some(&json!(["apps.users"])));
        assert_eq!(ctx.get("app_configs"), Some(&json!(["apps.users.apps.UsersConfig"])));
        assert_eq!(ctx.get("database_type"), Some(&json!("postgresql")));
        assert_eq!(ctx.get("secret_key"), Some(&json!("k")));
    }

    #[test]
    fn apps_dir_maps_dotted_nesting() {
        let root = Path::new("/p");
        assert_eq!(apps_dir(root, None), PathBuf::from("/p"));
        assert_eq!(apps_dir(root, Some("apps")), PathBuf::from("/p/apps"));
        assert_eq!(apps_dir(root, Some("src.apps")), PathBuf::from("/p/src/apps"));
        assert_eq!(apps_dir(root, Some("")), PathBuf::from("/p"));
    }

    #[test]
    fn register_apps_fills_empty_override() {
        let content = "USER_DEFINED_APPS = [\n]\n";
        let out = register_apps(content, &settings(), Path::new("base.py")).unwrap();
        assert_eq!(out, "USER_DEFINED_APPS = [\n    \"apps.users.apps.UsersConfig\",\n]\n");
    }

    #[test]
    fn register_apps_without_list_fails() {
        let err = register_apps("X = 1\n", &settings(), Path::new("base.py")).unwrap_err();
        assert!(matches!(err, ScaffoldError::AppsListMissing { .. }), "got: {err}");
    }

    #[test]
    fn validate_structure_lists_missing_files() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("manage.py"), "").unwrap();
        match validate_structure(root.path(), &settings()) {
            Err(ScaffoldError::MissingFiles(missing)) => {
                assert!(!missing.contains(&root.path().join("manage.py")));
                assert!(missing.contains(&root.path().join("config/settings/base.py")));
                assert!(missing.contains(&root.path().join("apps/users/apps.py")));
            }
            other => panic!("expected MissingFiles, got {other:?}"),
        }
    }
}
