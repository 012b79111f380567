//! `.djinit` project config: what `setup` generated, read back by `app`.
//!
//! Stored as pretty-printed JSON at the project root. Writes go through a
//! `.djinit.tmp` sibling and a rename so a crash never leaves half a file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{AppName, DatabaseType, ProjectName, ProjectSettings};

pub const CONFIG_FILE_NAME: &str = ".djinit";

/// App layout section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppsConfig {
    pub nested: bool,
    #[serde(default)]
    pub nested_dir: Option<String>,
    #[serde(default)]
    pub installed: Vec<AppName>,
}

/// Database section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub use_database_url: bool,
    #[serde(default)]
    pub database_type: DatabaseType,
}

/// Root of the `.djinit` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DjinitConfig {
    pub project_name: ProjectName,
    pub module_name: String,
    pub apps: AppsConfig,
    pub settings: DatabaseConfig,
    pub created_at: DateTime<Utc>,
}

impl DjinitConfig {
    pub fn from_settings(settings: &ProjectSettings) -> Self {
        DjinitConfig {
            project_name: settings.project_name.clone(),
            module_name: settings.module_name.clone(),
            apps: AppsConfig {
                nested: settings.nested_dir.is_some(),
                nested_dir: settings.nested_dir.clone(),
                installed: settings.apps.clone(),
            },
            settings: DatabaseConfig {
                use_database_url: settings.use_database_url,
                database_type: settings.database_type,
            },
            created_at: Utc::now(),
        }
    }

    /// Nested app directory, only when nesting is switched on.
    pub fn nested_dir(&self) -> Option<&str> {
        if self.apps.nested {
            self.apps.nested_dir.as_deref()
        } else {
            None
        }
    }

    /// Record `app` as installed; returns `false` if it already was.
    pub fn add_app(&mut self, app: AppName) -> bool {
        if self.apps.installed.contains(&app) {
            return false;
        }
        self.apps.installed.push(app);
        true
    }
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io { path: path.into(), source }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load `<root>/.djinit`.
///
/// Returns `CoreError::ConfigNotFound` if absent, `CoreError::Parse` if the
/// JSON does not match [`DjinitConfig`].
pub fn load_at(root: &Path) -> Result<DjinitConfig, CoreError> {
    let path = config_path(root);
    if !path.exists() {
        return Err(CoreError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// Serialize `config` to the text written on disk (trailing newline included).
pub fn to_json(config: &DjinitConfig) -> Result<String, CoreError> {
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    Ok(json)
}

/// Atomically write `<root>/.djinit`.
pub fn save_at(root: &Path, config: &DjinitConfig) -> Result<(), CoreError> {
    let path = config_path(root);
    let tmp_path = root.join(format!("{CONFIG_FILE_NAME}.tmp"));

    let json = to_json(config)?;
    std::fs::write(&tmp_path, json).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    tracing::debug!(path = %path.display(), "saved djinit config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DjinitConfig {
        let mut settings = ProjectSettings::new("shop");
        settings.module_name = "config".to_string();
        settings.apps = vec![AppName::from("users")];
        settings.nested_dir = Some("apps".to_string());
        settings.database_type = DatabaseType::Mysql;
        DjinitConfig::from_settings(&settings)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let root = TempDir::new().unwrap();
        let config = sample();
        save_at(root.path(), &config).expect("save");
        let loaded = load_at(root.path()).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(loaded.nested_dir(), Some("apps"));
    }

    #[test]
    fn save_leaves_no_tmp_file() {
        let root = TempDir::new().unwrap();
        save_at(root.path(), &sample()).unwrap();
        assert!(root.path().join(".djinit").exists());
        assert!(!root.path().join(".djinit.tmp").exists());
    }

    #[test]
    fn missing_config_is_not_found() {
        let root = TempDir::new().unwrap();
        let err = load_at(root.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }), "got: {err}");
    }

    #[test]
    fn malformed_config_reports_path() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(".djinit"), "{ not json").unwrap();
        let err = load_at(root.path()).unwrap_err();
        match err {
            CoreError::Parse { path, .. } => assert!(path.ends_with(".djinit")),
            other => panic!("expected Parse, got {other}"),
        }
    }

    #[test]
    fn nested_dir_ignored_when_not_nested() {
        let mut config = sample();
        config.apps.nested = false;
        assert_eq!(config.nested_dir(), None);
    }

    #[test]
    fn add_app_is_idempotent() {
        let mut config = sample();
        assert!(!config.add_app(AppName::from("users")));
        assert!(config.add_app(AppName::from("orders")));
        assert_eq!(config.apps.installed.len(), 2);
    }
}
