//! Domain types for a generated Django project.
//!
//! Names are stored already validated; see [`crate::validate`] for the rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Django release the generated requirements pin against.
pub const DJANGO_VERSION: &str = "5.2";

/// Python runtime written to `runtime.txt`.
pub const PYTHON_VERSION: &str = "3.12";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of the Django project (also the default configuration module).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Short name of a Django app (`users`, not `apps.users`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppName(pub String);

impl AppName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `user_profiles` → `UserProfiles`.
    pub fn config_name(&self) -> String {
        app_config_name(&self.0)
    }

    /// `user_profiles` → `UserProfilesConfig`.
    pub fn config_class(&self) -> String {
        app_config_class(&self.0)
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Python `str.title()` with underscores dropped: every letter that follows
/// a non-letter is upper-cased, all other letters lower-cased.
pub fn app_config_name(app: &str) -> String {
    let short = app.rsplit('.').next().unwrap_or(app);
    let mut out = String::with_capacity(short.len());
    let mut prev_is_letter = false;
    for c in short.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            prev_is_letter = false;
            if c != '_' {
                out.push(c);
            }
        }
    }
    out
}

pub fn app_config_class(app: &str) -> String {
    format!("{}Config", app_config_name(app))
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Database backend configured for production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Postgresql,
    Mysql,
    Sqlite,
}

impl DatabaseType {
    pub fn all() -> &'static [DatabaseType] {
        &[DatabaseType::Postgresql, DatabaseType::Mysql, DatabaseType::Sqlite]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Postgresql => "postgresql",
            DatabaseType::Mysql => "mysql",
            DatabaseType::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseType::Postgresql),
            "mysql" => Ok(DatabaseType::Mysql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            _ => Err(CoreError::UnknownDatabase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectSettings
// ---------------------------------------------------------------------------

/// Everything `setup` needs to lay out a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub project_name: ProjectName,
    /// Configuration package holding `settings/`, `urls.py`, `wsgi.py`.
    pub module_name: String,
    #[serde(default)]
    pub apps: Vec<AppName>,
    /// Directory the apps live under (`apps` ⇒ `apps/users`), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_dir: Option<String>,
    pub use_database_url: bool,
    #[serde(default)]
    pub database_type: DatabaseType,
}

impl ProjectSettings {
    /// Defaults: module named after the project, no apps, `DATABASE_URL`
    /// with PostgreSQL.
    pub fn new(project_name: impl Into<ProjectName>) -> Self {
        let project_name = project_name.into();
        ProjectSettings {
            module_name: project_name.0.clone(),
            project_name,
            apps: Vec::new(),
            nested_dir: None,
            use_database_url: true,
            database_type: DatabaseType::default(),
        }
    }

    /// Python import path of `app`.
    pub fn app_module(&self, app: &AppName) -> String {
        app_module_path(self.nested_dir.as_deref(), app)
    }

    pub fn app_modules(&self) -> Vec<String> {
        self.apps.iter().map(|a| self.app_module(a)).collect()
    }

    /// `INSTALLED_APPS` entries: `<module>.apps.<Name>Config`.
    pub fn app_configs(&self) -> Vec<String> {
        self.apps
            .iter()
            .map(|a| app_config_path(&self.app_module(a)))
            .collect()
    }

    /// Distribution name for `pyproject.toml`: lower-case, hyphenated.
    pub fn package_name(&self) -> String {
        self.project_name.0.to_lowercase().replace('_', "-")
    }
}

/// `<nested_dir>.<app>` when apps are nested, else `<app>`.
pub fn app_module_path(nested_dir: Option<&str>, app: &AppName) -> String {
    match nested_dir.map(|d| d.trim_matches(|c| c == '/' || c == '.')) {
        Some(dir) if !dir.is_empty() => format!("{}.{}", dir.replace('/', "."), app),
        _ => app.0.clone(),
    }
}

/// `apps.users` → `apps.users.apps.UsersConfig`.
pub fn app_config_path(module: &str) -> String {
    format!("{module}.apps.{}", app_config_class(module))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ProjectName::from("shop").to_string(), "shop");
        assert_eq!(AppName::from(String::from("users")).to_string(), "users");
    }

    #[test]
    fn config_names_follow_title_case() {
        assert_eq!(app_config_name("users"), "Users");
        assert_eq!(app_config_name("user_profiles"), "UserProfiles");
        assert_eq!(app_config_name("apps.order_items"), "OrderItems");
        assert_eq!(app_config_name("api2data"), "Api2Data");
        assert_eq!(app_config_name("HTTPLogs"), "Httplogs");
        assert_eq!(AppName::from("blog").config_class(), "BlogConfig");
    }

    #[test]
    fn database_type_parses_aliases() {
        assert_eq!("postgres".parse::<DatabaseType>().unwrap(), DatabaseType::Postgresql);
        assert_eq!("MySQL".parse::<DatabaseType>().unwrap(), DatabaseType::Mysql);
        assert_eq!("sqlite3".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert!(matches!(
            "oracle".parse::<DatabaseType>(),
            Err(CoreError::UnknownDatabase(ref s)) if s == "oracle"
        ));
    }

    #[test]
    fn module_paths_respect_nested_dir() {
        let mut settings = ProjectSettings::new("shop");
        settings.apps = vec![AppName::from("users"), AppName::from("order_items")];
        assert_eq!(settings.module_name, "shop");
        assert_eq!(settings.app_modules(), vec!["users", "order_items"]);

        settings.nested_dir = Some("apps/".to_string());
        assert_eq!(settings.app_modules(), vec!["apps.users", "apps.order_items"]);
        assert_eq!(
            settings.app_configs(),
            vec!["apps.users.apps.UsersConfig", "apps.order_items.apps.OrderItemsConfig"]
        );
    }

    #[test]
    fn package_name_is_hyphenated() {
        assert_eq!(ProjectSettings::new("My_Shop").package_name(), "my-shop");
    }
}
