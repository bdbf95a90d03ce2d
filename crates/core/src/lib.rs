#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod types;

// --- Re-exports ---

// Errors
pub use error::{AutocomposeError, ConfigError, EngineError};

// Configuration
pub use config::{AutocomposeConfig, ComposeConfig, EngineConfig, EngineKind, GeneralConfig};

// Domain types
pub use types::{AttributeTree, ContainerSummary, DEFAULT_NETWORKS, NetworkSummary};
