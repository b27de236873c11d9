use std::path::PathBuf;

use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn '{program}' failed: {reason}")]
    Spawn { program: String, reason: String },
    #[error("cannot open log file {path}: {reason}")]
    LogFile { path: PathBuf, reason: String },
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}
