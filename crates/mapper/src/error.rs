//! Mapper error types
//!
//! [`MapperError`] covers everything that can go wrong between the engine
//! client and the rendered document. It converts into
//! [`AutocomposeError`] so callers can propagate it with `?`.

use autocompose_core::error::{AutocomposeError, ConfigError, EngineError};

/// Errors raised while building a compose document
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// Engine call failed in a way that cannot be skipped
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// `--filter` is not a valid regular expression
    #[error("invalid filter '{pattern}': {reason}")]
    InvalidFilter {
        /// Pattern as given by the user
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// Inspect output lacks an attribute the mapping cannot do without
    #[error("container attributes missing '{0}'")]
    MissingAttribute(&'static str),

    /// Document serialization failed
    #[error("render error: {0}")]
    Render(String),
}

impl From<MapperError> for AutocomposeError {
    fn from(err: MapperError) -> Self {
        match err {
            MapperError::Engine(e) => AutocomposeError::Engine(e),
            MapperError::InvalidFilter { pattern, reason } => {
                AutocomposeError::Config(ConfigError::InvalidValue {
                    field: "filter".to_owned(),
                    reason: format!("'{pattern}': {reason}"),
                })
            }
            other => AutocomposeError::Render(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_display() {
        let err = MapperError::InvalidFilter {
            pattern: "web(".to_owned(),
            reason: "unclosed group".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("web("));
        assert!(msg.contains("unclosed group"));
    }

    #[test]
    fn engine_error_is_transparent() {
        let err = MapperError::from(EngineError::Unavailable("no socket".to_owned()));
        assert_eq!(err.to_string(), "container engine unavailable: no socket");
    }

    #[test]
    fn converts_engine_error_unchanged() {
        let err = MapperError::Engine(EngineError::Api("boom".to_owned()));
        let top: AutocomposeError = err.into();
        assert!(matches!(top, AutocomposeError::Engine(EngineError::Api(_))));
    }

    #[test]
    fn invalid_filter_becomes_config_error() {
        let err = MapperError::InvalidFilter {
            pattern: "[".to_owned(),
            reason: "unclosed class".to_owned(),
        };
        let top: AutocomposeError = err.into();
        assert!(matches!(
            top,
            AutocomposeError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "filter"
        ));
    }

    #[test]
    fn missing_attribute_becomes_render_error() {
        let top: AutocomposeError = MapperError::MissingAttribute("Name").into();
        assert!(matches!(top, AutocomposeError::Render(msg) if msg.contains("Name")));
    }
}
