//! `djinit app`: add a Django app to an existing project.
//!
//! An app directory holds:
//!
//! ```text
//! <app>/__init__.py apps.py models.py views.py admin.py urls.py
//!       serializers.py routes.py tests.py migrations/__init__.py
//! ```
//!
//! After the files are written the app's AppConfig path is registered in
//! `USER_DEFINED_APPS` and, when a `.djinit` file exists, in its installed
//! app list.

use std::path::{Path, PathBuf};

use serde::Serialize;

use djinit_core::{
    config,
    types::{app_config_path, app_module_path, AppName},
    CoreError,
};
use djinit_template::{Context, TemplateEngine};

use crate::diff::unified_diff;
use crate::error::{io_err, ScaffoldError};
use crate::project::{apps_dir, ensure_package, render_file};
use crate::settings;
use crate::writer::{read_existing, write_file, WriteResult};

const APP_FILES: &[(&str, &str)] = &[
    ("apps.py", "components/apps.py-tpl"),
    ("models.py", "components/models.py-tpl"),
    ("views.py", "components/views.py-tpl"),
    ("admin.py", "components/admin.py-tpl"),
    ("urls.py", "components/urls.py-tpl"),
    ("serializers.py", "components/serializers.py-tpl"),
    ("routes.py", "components/routes.py-tpl"),
    ("tests.py", "components/tests.py-tpl"),
];

#[derive(Serialize)]
struct AppContext<'a> {
    app_name: &'a str,
    app_module: &'a str,
    app_config_name: String,
}

/// Render and write one app's files into `app_dir`.
pub(crate) fn write_app_files(
    app_dir: &Path,
    app: &AppName,
    module: &str,
    engine: &TemplateEngine,
    dry_run: bool,
) -> Result<Vec<WriteResult>, ScaffoldError> {
    let ctx = Context::from_serialize(&AppContext {
        app_name: app.as_str(),
        app_module: module,
        app_config_name: app.config_name(),
    })?;
    tracing::debug!(app = %app, module, "writing app files");

    let mut writes = vec![write_file(&app_dir.join("__init__.py"), "", dry_run)?];
    for (file, template) in APP_FILES {
        let content = render_file(engine, template, &ctx)?;
        writes.push(write_file(&app_dir.join(file), &content, dry_run)?);
    }
    writes.push(write_file(
        &app_dir.join("migrations").join("__init__.py"),
        "",
        dry_run,
    )?);
    Ok(writes)
}

// ---------------------------------------------------------------------------
// Project layout discovery
// ---------------------------------------------------------------------------

/// Where an existing project keeps its settings and apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub base_settings: PathBuf,
    /// Dotted package apps live in, e.g. `apps`.
    pub nested_dir: Option<String>,
    /// Whether a `.djinit` file described this layout.
    pub from_config: bool,
}

impl ProjectLayout {
    /// Locate `settings/base.py` under `root`.
    ///
    /// A readable `.djinit` wins. Otherwise the first child directory (in
    /// name order) holding `settings/base.py` is used, then `root/settings`.
    /// Without a config the nesting is read back from the registered apps.
    pub fn discover(root: &Path) -> Result<Self, ScaffoldError> {
        match config::load_at(root) {
            Ok(cfg) => {
                let base_settings = root.join(&cfg.module_name).join("settings").join("base.py");
                if base_settings.is_file() {
                    return Ok(Self {
                        root: root.to_path_buf(),
                        base_settings,
                        nested_dir: cfg.nested_dir().map(str::to_string),
                        from_config: true,
                    });
                }
                tracing::warn!(
                    "{} names module {:?} but {} is missing; scanning instead",
                    config::CONFIG_FILE_NAME,
                    cfg.module_name,
                    base_settings.display()
                );
            }
            Err(CoreError::ConfigNotFound { .. }) => {}
            Err(err) => tracing::warn!("ignoring unreadable config: {err}"),
        }

        let base_settings = find_base_settings(root)?.ok_or_else(|| {
            ScaffoldError::SettingsNotFound {
                path: root.to_path_buf(),
            }
        })?;
        let content = read_existing(&base_settings)?.unwrap_or_default();
        let nested_dir = infer_nested_dir(root, &settings::existing_apps(&content));
        Ok(Self {
            root: root.to_path_buf(),
            base_settings,
            nested_dir,
            from_config: false,
        })
    }

    pub fn apps_dir(&self) -> PathBuf {
        apps_dir(&self.root, self.nested_dir.as_deref())
    }
}

fn find_base_settings(root: &Path) -> Result<Option<PathBuf>, ScaffoldError> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .map_err(|e| io_err(root, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.') && n != "__pycache__")
        })
        .collect();
    dirs.sort();

    let candidate = dirs
        .into_iter()
        .map(|d| d.join("settings").join("base.py"))
        .find(|p| p.is_file())
        .or_else(|| Some(root.join("settings").join("base.py")).filter(|p| p.is_file()));
    Ok(candidate)
}

/// `apps.users.apps.UsersConfig` → `apps`, when `<root>/apps` exists.
fn infer_nested_dir(root: &Path, entries: &[String]) -> Option<String> {
    entries.iter().find_map(|entry| {
        let module = match entry.split_once(".apps.") {
            Some((module, class)) if class.ends_with("Config") => module,
            _ => entry.as_str(),
        };
        let (parent, _) = module.rsplit_once('.')?;
        root.join(parent.replace('.', "/"))
            .is_dir()
            .then(|| parent.to_string())
    })
}

// ---------------------------------------------------------------------------
// create_app
// ---------------------------------------------------------------------------

/// How the app ended up in `USER_DEFINED_APPS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// A bare module entry was rewritten to the AppConfig path.
    Upgraded { from: String },
    AlreadyPresent,
}

#[derive(Debug)]
pub struct AppOutcome {
    pub app_dir: PathBuf,
    pub module_path: String,
    pub config_path: String,
    pub writes: Vec<WriteResult>,
    pub registration: Registration,
    /// Preview of the settings edit; only filled on a dry run.
    pub settings_diff: Option<String>,
}

/// Create app `name` inside the Django project at `root`.
pub fn create_app(
    root: &Path,
    name: &AppName,
    engine: &TemplateEngine,
    dry_run: bool,
) -> Result<AppOutcome, ScaffoldError> {
    if !root.join("manage.py").is_file() {
        return Err(ScaffoldError::NotADjangoProject {
            path: root.to_path_buf(),
        });
    }
    let layout = ProjectLayout::discover(root)?;
    let app_root = layout.apps_dir();
    let app_dir = app_root.join(name.as_str());
    if app_dir.exists() {
        return Err(ScaffoldError::AppExists { path: app_dir });
    }

    let module_path = app_module_path(layout.nested_dir.as_deref(), name);
    let config_path = app_config_path(&module_path);
    tracing::info!(app = %name, module = %module_path, "creating app");

    let current = read_existing(&layout.base_settings)?.ok_or_else(|| {
        ScaffoldError::SettingsNotFound {
            path: layout.base_settings.clone(),
        }
    })?;
    let (updated, registration) =
        register(&current, &module_path, &config_path, &layout.base_settings)?;

    let mut writes = Vec::new();
    if layout.nested_dir.is_some() {
        writes.push(ensure_package(&app_root, dry_run)?);
    }
    writes.extend(write_app_files(&app_dir, name, &module_path, engine, dry_run)?);
    let settings_diff = dry_run.then(|| {
        let label = layout
            .base_settings
            .strip_prefix(root)
            .unwrap_or(&layout.base_settings);
        unified_diff(&label.display().to_string(), &current, &updated)
    });
    if updated != current {
        writes.push(write_file(&layout.base_settings, &updated, dry_run)?);
    }

    if layout.from_config && !dry_run {
        let mut cfg = config::load_at(root)?;
        if cfg.add_app(name.clone()) {
            config::save_at(root, &cfg)?;
        }
    }

    Ok(AppOutcome {
        app_dir,
        module_path,
        config_path,
        writes,
        registration,
        settings_diff,
    })
}

fn register(
    content: &str,
    module: &str,
    config_path: &str,
    path: &Path,
) -> Result<(String, Registration), ScaffoldError> {
    let existing = settings::existing_apps(content);
    if existing.iter().any(|e| e == config_path) {
        return Ok((content.to_string(), Registration::AlreadyPresent));
    }
    if existing.iter().any(|e| e == module) {
        if let Some(updated) = settings::replace_app(content, module, config_path) {
            return Ok((
                updated,
                Registration::Upgraded {
                    from: module.to_string(),
                },
            ));
        }
    }
    settings::insert_apps(content, &[config_path])
        .map(|updated| (updated, Registration::Added))
        .ok_or_else(|| ScaffoldError::AppsListMissing {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE: &str = "USER_DEFINED_APPS = [\n    \"users\",\n]\n";

    #[test]
    fn register_adds_missing_entry() {
        let (out, reg) = register(BASE, "blog", "blog.apps.BlogConfig", Path::new("b")).unwrap();
        assert_eq!(reg, Registration::Added);
        assert!(out.contains("    \"blog.apps.BlogConfig\",\n]"));
    }

    #[test]
    fn register_upgrades_bare_module() {
        let (out, reg) =
            register(BASE, "users", "users.apps.UsersConfig", Path::new("b")).unwrap();
        assert_eq!(reg, Registration::Upgraded { from: "users".to_string() });
        assert_eq!(out, "USER_DEFINED_APPS = [\n    \"users.apps.UsersConfig\",\n]\n");
    }

    #[test]
    fn register_keeps_present_config() {
        let content = "USER_DEFINED_APPS = [\n    \"users.apps.UsersConfig\",\n]\n";
        let (out, reg) =
            register(content, "users", "users.apps.UsersConfig", Path::new("b")).unwrap();
        assert_eq!(reg, Registration::AlreadyPresent);
        assert_eq!(out, content);
    }

    #[test]
    fn infers_nesting_from_registered_entries() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("apps")).unwrap();
        let entries = vec!["apps.users.apps.UsersConfig".to_string()];
        assert_eq!(infer_nested_dir(root.path(), &entries), Some("apps".to_string()));

        let flat = vec!["users.apps.UsersConfig".to_string()];
        assert_eq!(infer_nested_dir(root.path(), &flat), None);

        let missing_dir = vec!["src.blog".to_string()];
        assert_eq!(infer_nested_dir(root.path(), &missing_dir), None);
    }

    #[test]
    fn discover_scans_children_in_name_order() {
        let root = TempDir::new().unwrap();
        for module in ["zeta", "alpha"] {
            let settings = root.path().join(module).join("settings");
            std::fs::create_dir_all(&settings).unwrap();
            std::fs::write(settings.join("base.py"), BASE).unwrap();
        }
        let layout = ProjectLayout::discover(root.path()).unwrap();
        assert_eq!(layout.base_settings, root.path().join("alpha/settings/base.py"));
        assert!(!layout.from_config);
        assert_eq!(layout.nested_dir, None);
    }

    #[test]
    fn discover_without_settings_fails() {
        let root = TempDir::new().unwrap();
        let err = ProjectLayout::discover(root.path()).unwrap_err();
        assert!(matches!(err, ScaffoldError::SettingsNotFound { .. }), "got: {err}");
    }
}
