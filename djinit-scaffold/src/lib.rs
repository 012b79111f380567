//! # djinit-scaffold
//!
//! Renders the bundled templates into a Django project tree.
//!
//! [`create_project`] lays out a whole project; [`create_app`] adds one app
//! to an existing project and registers it in `settings/base.py`. Every
//! write goes through the content-gated [`writer::write_file`], so re-running
//! a command only touches files whose content changed.

pub mod app;
pub mod diff;
pub mod error;
pub mod project;
pub mod settings;
pub mod writer;

pub use app::{create_app, AppOutcome, ProjectLayout, Registration};
pub use error::ScaffoldError;
pub use project::{create_project, validate_structure};
pub use writer::{write_file, WriteResult};
