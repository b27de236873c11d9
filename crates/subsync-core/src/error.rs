use std::path::PathBuf;

use thiserror::Error;

use subsync_exec::ExecError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("no line containing '{marker}' found")]
    MissingStartMarker { marker: &'static str },

    #[error("no line containing '{marker}' found after the start marker")]
    MissingEndMarker { marker: &'static str },

    #[error("line {line}: {reason}")]
    InvalidItem { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("scratch directory {path}: {reason}")]
    Scratch { path: PathBuf, reason: String },

    #[error("exec error: {0}")]
    Exec(#[from] ExecError),

    #[error("backend '{backend}' cannot run '{action}'")]
    Unsupported {
        backend: &'static str,
        action: &'static str,
    },
}

impl CoreError {
    /// Errors that stop the run before anything is launched because the setup is wrong.
    pub fn is_configuration(&self) -> bool {
        matches!(self, CoreError::Config(_) | CoreError::Remote(_))
    }
}
