//! Configuration: `autocompose.toml` parsing and runtime settings
//!
//! [`AutocomposeConfig`] holds every section. Each crate reads only its own.
//!
//! # Precedence
//! 1. CLI flags (highest)
//! 2. Environment variables (`AUTOCOMPOSE_ENGINE_KIND=podman`)
//! 3. Config file (`autocompose.toml`)
//! 4. Defaults (`Default` impls)
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), autocompose_core::error::AutocomposeError> {
//! use autocompose_core::config::AutocomposeConfig;
//!
//! // File plus environment overrides
//! let config = AutocomposeConfig::load("autocompose.toml").await?;
//!
//! // Straight from a TOML string
//! let config = AutocomposeConfig::parse("[engine]\nkind = \"docker\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AutocomposeError, ConfigError};

/// Complete autocompose configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocomposeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
}

impl AutocomposeConfig {
    /// Loads a TOML file, applies environment overrides and validates.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AutocomposeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, AutocomposeError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file without environment overrides.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AutocomposeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AutocomposeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AutocomposeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, AutocomposeError> {
        toml::from_str(toml_str).map_err(|e| {
            AutocomposeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// Applies `AUTOCOMPOSE_{SECTION}_{FIELD}` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "AUTOCOMPOSE_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "AUTOCOMPOSE_GENERAL_LOG_FORMAT",
        );

        // Engine
        override_parsed(&mut self.engine.kind, "AUTOCOMPOSE_ENGINE_KIND");
        override_string(&mut self.engine.socket, "AUTOCOMPOSE_ENGINE_SOCKET");
        override_parsed(
            &mut self.engine.timeout_secs,
            "AUTOCOMPOSE_ENGINE_TIMEOUT_SECS",
        );

        // Compose
        override_string(&mut self.compose.version, "AUTOCOMPOSE_COMPOSE_VERSION");
        override_parsed(
            &mut self.compose.create_volumes,
            "AUTOCOMPOSE_COMPOSE_CREATE_VOLUMES",
        );
        override_parsed(
            &mut self.compose.external_networks,
            "AUTOCOMPOSE_COMPOSE_EXTERNAL_NETWORKS",
        );
    }

    /// Validates value ranges.
    pub fn validate(&self) -> Result<(), AutocomposeError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.compose.version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compose.version".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// trace, debug, info, warn, error
    pub log_level: String,
    /// json, pretty, compact
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "compact".to_owned(),
        }
    }
}

/// Which container engine to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Podman when its socket exists, Docker otherwise
    #[default]
    Auto,
    Docker,
    Podman,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Docker => "docker",
            Self::Podman => "podman",
        };
        f.write_str(s)
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            other => Err(ConfigError::InvalidValue {
                field: "engine.kind".to_owned(),
                reason: format!("unknown engine '{other}' (expected: auto, docker, podman)"),
            }),
        }
    }
}

/// Container engine connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Socket path; empty means the engine's default location
    pub socket: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Auto,
            socket: String::new(),
            timeout_secs: 120,
        }
    }
}

/// Output document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Value of the top-level `version` key
    pub version: String,
    /// Declare fresh volumes instead of referencing existing ones
    pub create_volumes: bool,
    /// Reference networks as `external: true` instead of declaring them
    pub external_networks: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            version: "3.8".to_owned(),
            create_volumes: false,
            external_networks: false,
        }
    }
}

// --- environment override helpers ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse value from env var, ignoring"
            ),
        }
    }
}
