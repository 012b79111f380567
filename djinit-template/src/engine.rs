//! Template registry: embedded `-tpl` files plus optional user overrides.
//!
//! | Group        | Templates                                                   |
//! |--------------|-------------------------------------------------------------|
//! | `project/`   | manage.py, gitignore, requirements, readme, env sample, ... |
//! | `config/`    | settings package, urls, wsgi, asgi                          |
//! | `components/`| per-app modules (apps, models, views, serializers, ...)     |
//!
//! A user directory may shadow any embedded template by placing a file with
//! the same relative path (e.g. `config/settings/base.py-tpl`) under it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::RenderError;
use crate::template::Template;

/// Suffix every template file carries.
pub const TEMPLATE_SUFFIX: &str = "-tpl";

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("project/manage.py-tpl", include_str!("templates/project/manage.py-tpl")),
    ("project/gitignore-tpl", include_str!("templates/project/gitignore-tpl")),
    ("project/requirements-tpl", include_str!("templates/project/requirements-tpl")),
    ("project/readme.md-tpl", include_str!("templates/project/readme.md-tpl")),
    ("project/env_sample-tpl", include_str!("templates/project/env_sample-tpl")),
    ("project/justfile-tpl", include_str!("templates/project/justfile-tpl")),
    ("project/procfile-tpl", include_str!("templates/project/procfile-tpl")),
    ("project/runtime_txt-tpl", include_str!("templates/project/runtime_txt-tpl")),
    (
        "project/pyproject.toml-tpl",
        include_str!("templates/project/pyproject.toml-tpl"),
    ),
    (
        "config/settings/base.py-tpl",
        include_str!("templates/config/settings/base.py-tpl"),
    ),
    (
        "config/settings/development.py-tpl",
        include_str!("templates/config/settings/development.py-tpl"),
    ),
    (
        "config/settings/production.py-tpl",
        include_str!("templates/config/settings/production.py-tpl"),
    ),
    ("config/urls.py-tpl", include_str!("templates/config/urls.py-tpl")),
    ("config/wsgi.py-tpl", include_str!("templates/config/wsgi.py-tpl")),
    ("config/asgi.py-tpl", include_str!("templates/config/asgi.py-tpl")),
    ("components/apps.py-tpl", include_str!("templates/components/apps.py-tpl")),
    ("components/models.py-tpl", include_str!("templates/components/models.py-tpl")),
    ("components/views.py-tpl", include_str!("templates/components/views.py-tpl")),
    ("components/admin.py-tpl", include_str!("templates/components/admin.py-tpl")),
    ("components/urls.py-tpl", include_str!("templates/components/urls.py-tpl")),
    (
        "components/serializers.py-tpl",
        include_str!("templates/components/serializers.py-tpl"),
    ),
    ("components/routes.py-tpl", include_str!("templates/components/routes.py-tpl")),
    ("components/tests.py-tpl", include_str!("templates/components/tests.py-tpl")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "user template directory does not exist");
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();

    let mut templates = Vec::new();
    for path in files {
        let is_template = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.ends_with(TEMPLATE_SUFFIX));
        if !is_template {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Named, pre-compiled templates. Build once and reuse.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    templates: BTreeMap<String, Template>,
}

impl TemplateEngine {
    /// Load the embedded templates, then any `*-tpl` files found under
    /// `user_template_dir`, which replace embedded ones of the same name.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut templates = BTreeMap::new();
        for (name, content) in TPLS {
            templates.insert(normalize_template_name(Path::new(name)), Template::parse(content));
        }
        if let Some(dir) = user_template_dir {
            for (name, content) in load_user_templates(dir)? {
                if templates.contains_key(&name) {
                    tracing::info!(template = %name, "using user override");
                } else {
                    tracing::debug!(template = %name, "registered user template");
                }
                templates.insert(name, Template::parse(&content));
            }
        }
        Ok(TemplateEngine { templates })
    }

    /// Render the template registered as `name` (e.g. `components/apps.py-tpl`).
    pub fn render_template(&self, name: &str, ctx: &Context) -> Result<String, RenderError> {
        let key = normalize_template_name(Path::new(name));
        let template = self
            .templates
            .get(&key)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        tracing::debug!(template = %key, "rendering");
        Ok(template.render(ctx))
    }

    /// Render template text that is not registered with the engine.
    pub fn render_string(&self, text: &str, ctx: &Context) -> String {
        crate::template::render(text, ctx)
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn template_exists(&self, name: &str) -> bool {
        self.templates
            .contains_key(&normalize_template_name(Path::new(name)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn embedded_templates_are_registered() {
        let engine = TemplateEngine::new(None).unwrap();
        assert_eq!(engine.template_names().len(), TPLS.len());
        assert!(engine.template_exists("config/settings/base.py-tpl"));
        assert!(engine.template_exists("Components/Apps.py-tpl"));
        assert!(!engine.template_exists("components/missing.py-tpl"));
    }

    #[test]
    fn missing_template_is_an_error() {
        let engine = TemplateEngine::new(None).unwrap();
        let err = engine
            .render_template("nope-tpl", &Context::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(ref n) if n == "nope-tpl"));
    }

    #[test]
    fn user_templates_override_and_extend() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("components")).unwrap();
        std::fs::write(
            dir.path().join("components/models.py-tpl"),
            "# custom models for [[ app_name ]]",
        )
        .unwrap();
        std::fs::write(dir.path().join("extra-tpl"), "extra").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let engine = TemplateEngine::new(Some(dir.path())).unwrap();
        let ctx = Context::from_serialize(&json!({"app_name": "users"})).unwrap();
        assert_eq!(
            engine.render_template("components/models.py-tpl", &ctx).unwrap(),
            "# custom models for users"
        );
        assert!(engine.template_exists("extra-tpl"));
        assert!(!engine.template_exists("notes.txt"));
        assert_eq!(engine.template_names().len(), TPLS.len() + 1);
    }

    #[test]
    fn missing_user_dir_falls_back_to_embedded() {
        let dir = TempDir::new().unwrap();
        let engine = TemplateEngine::new(Some(&dir.path().join("absent"))).unwrap();
        assert_eq!(engine.template_names().len(), TPLS.len());
    }

    #[test]
    fn render_string_uses_same_interpreter() {
        let engine = TemplateEngine::new(None).unwrap();
        let ctx = Context::from_serialize(&json!({"name": "users"})).unwrap();
        assert_eq!(engine.render_string("Hello [[ name ]]!", &ctx), "Hello users!");
    }
}
