//! Error types, one enum per domain

/// Top-level autocompose error
#[derive(Debug, thiserror::Error)]
pub enum AutocomposeError {
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Container engine errors
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Document rendering failed
    #[error("render error: {0}")]
    Render(String),

    /// I/O errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// Config file could not be parsed
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// A config value is out of range
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Container engine errors
///
/// `ContainerNotFound` and `NetworkNotFound` are recoverable: the generator
/// logs them and moves on to the next item. `Unavailable` aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine socket unreachable or ping failed
    #[error("container engine unavailable: {0}")]
    Unavailable(String),

    /// No container matched the requested name or id
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// No network matched the requested name
    #[error("network not found: {0}")]
    NetworkNotFound(String),

    /// Any other API failure
    #[error("engine api error: {0}")]
    Api(String),

    /// Identifier rejected before reaching the engine
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl EngineError {
    /// Whether the run can continue past this error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound(_) | Self::NetworkNotFound(_))
    }
}
