//! djinit core library: domain types, name rules, `.djinit` config, secrets.
//!
//! - [`types`]: newtypes, [`DatabaseType`], [`ProjectSettings`]
//! - [`validate`]: project/app name rules
//! - [`config`]: load / save `.djinit`
//! - [`secret`]: `SECRET_KEY` generation
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod secret;
pub mod types;
pub mod validate;

pub use config::DjinitConfig;
pub use error::{CoreError, NameKind, NameRule};
pub use types::{AppName, DatabaseType, ProjectName, ProjectSettings};
