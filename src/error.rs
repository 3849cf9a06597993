// std imports
use std::io;
use std::path::PathBuf;

// third-party imports
use config::ConfigError;
use thiserror::Error;

/// Error is an error which may occur in the library or the command line tool.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    InvalidLevel(#[from] InvalidLevelError),
    #[error("empty directory name")]
    EmptyDirectory,
    #[error("non-regular {role} file {path:?} ({kind})")]
    NonRegularFile {
        path: PathBuf,
        role: FileRole,
        kind: String,
    },
    #[error("command {0:?} not found: {1}")]
    CommandNotFound(String, #[source] which::Error),
    #[error("empty command line")]
    EmptyCommand,
    #[error("{command:?} failed with exit code {code}, stderr:\n{stderr}")]
    CommandFailed { command: String, code: i32, stderr: String },
    #[error("{command:?} was terminated by a signal, stderr:\n{stderr}")]
    CommandTerminated { command: String, stderr: String },
    #[error("failed to initialize logging backend: {0}")]
    LoggerInit(#[from] log::SetLoggerError),
}

/// Identifies which side of a copy operation a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FileRole {
    Source,
    Destination,
}

/// InvalidLevelError is an error which may occur when parsing a logging level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid level {value:?}, use any of {valid_values:?}")]
pub struct InvalidLevelError {
    pub value: String,
    pub valid_values: Vec<String>,
}

/// Result is an alias for standard result with bound Error type.
pub type Result<T> = std::result::Result<T, Error>;
