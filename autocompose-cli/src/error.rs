//! CLI-specific error types and exit code mapping

use autocompose_core::error::{AutocomposeError, EngineError};
use autocompose_mapper::MapperError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine could not be reached at startup.
    #[error("an error occurred while connecting to the container engine: {0}")]
    EngineUnavailable(String),

    /// None of the requested containers exist.
    #[error("no container found for: {}", .0.join(", "))]
    NothingFound(Vec<String>),

    /// Tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// IO error (stdout write, output file, ...).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error.
    #[error("{0}")]
    Core(AutocomposeError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | Engine unreachable, lookup or I/O failure |
    /// | 2    | Configuration error                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(AutocomposeError::Config(_)) => 2,
            Self::EngineUnavailable(_)
            | Self::NothingFound(_)
            | Self::Logging(_)
            | Self::Io(_)
            | Self::Core(_) => 1,
        }
    }
}

impl From<AutocomposeError> for CliError {
    fn from(e: AutocomposeError) -> Self {
        match e {
            AutocomposeError::Engine(EngineError::Unavailable(reason)) => {
                Self::EngineUnavailable(reason)
            }
            AutocomposeError::Io(io) => Self::Io(io),
            other => Self::Core(other),
        }
    }
}

impl From<MapperError> for CliError {
    fn from(e: MapperError) -> Self {
        AutocomposeError::from(e).into()
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        AutocomposeError::from(e).into()
    }
}
