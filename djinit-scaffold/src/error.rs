//! Error types for djinit-scaffold.

use std::path::PathBuf;

use thiserror::Error;

use djinit_core::CoreError;
use djinit_template::RenderError;

/// All errors that can arise while generating project or app files.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// An error from the template engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the core library (config file, names).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `manage.py` in the directory `djinit app` was run from.
    #[error("not a Django project (no manage.py in {path}); run this from the project root")]
    NotADjangoProject { path: PathBuf },

    /// The target app directory is already there.
    #[error("Django app already exists at {path}")]
    AppExists { path: PathBuf },

    /// No `<module>/settings/base.py` could be located.
    #[error("could not find settings/base.py under {path}")]
    SettingsNotFound { path: PathBuf },

    /// `base.py` has no `USER_DEFINED_APPS = [` list to register apps in.
    #[error("USER_DEFINED_APPS list not found in {path}")]
    AppsListMissing { path: PathBuf },

    /// Files expected after generation are absent.
    #[error("project structure incomplete, missing: {}", display_paths(.0))]
    MissingFiles(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience constructor for [`ScaffoldError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ScaffoldError {
    ScaffoldError::Io {
        path: path.into(),
        source,
    }
}
