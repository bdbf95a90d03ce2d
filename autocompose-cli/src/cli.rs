//! CLI argument parsing using clap derive API
//!
//! Purely declarative: turning arguments into a [`Selection`] and folding
//! flags over the loaded configuration has no side effects.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use autocompose_core::config::{AutocomposeConfig, EngineKind};
use autocompose_mapper::{DocumentFormat, Selection};

/// Generate a compose file from running containers.
///
/// Containers can be named by name, full id or short id.
#[derive(Parser, Debug)]
#[command(name = "autocompose", version, about, long_about = None)]
pub struct Cli {
    /// Containers to include (names, ids or short ids).
    #[arg(value_name = "NAME", required_unless_present = "all")]
    pub names: Vec<String>,

    /// Include all containers known to the engine.
    #[arg(short, long)]
    pub all: bool,

    /// Only keep containers whose reference matches this regex.
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Create new volumes instead of reusing existing ones.
    #[arg(short = 'c', long = "createvolumes", alias = "create-volumes")]
    pub create_volumes: bool,

    /// Reference networks as external instead of declaring them.
    #[arg(short = 'e', long = "externalnetworks", alias = "external-networks")]
    pub external_networks: bool,

    /// Path to an autocompose.toml configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Container engine to talk to.
    #[arg(long)]
    pub engine: Option<EngineArg>,

    /// Engine API socket path.
    #[arg(long, value_name = "PATH")]
    pub socket: Option<String>,

    /// Value of the top-level `version` key.
    #[arg(long, value_name = "VERSION")]
    pub compose_version: Option<String>,

    /// Output format.
    #[arg(long, default_value = "yaml")]
    pub format: FormatArg,

    /// Write the document to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Engine selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Podman when its socket exists, Docker otherwise.
    Auto,
    Docker,
    Podman,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => Self::Auto,
            EngineArg::Docker => Self::Docker,
            EngineArg::Podman => Self::Podman,
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Compose YAML.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl From<FormatArg> for DocumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => Self::Yaml,
            FormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    /// Which containers to render.
    pub fn selection(&self) -> Selection {
        Selection {
            names: self.names.clone(),
            all: self.all,
            filter: self.filter.clone(),
        }
    }

    /// Applies command-line flags on top of file and environment settings.
    ///
    /// Boolean flags only ever switch a setting on.
    pub fn apply_overrides(&self, config: &mut AutocomposeConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(engine) = self.engine {
            config.engine.kind = engine.into();
        }
        if let Some(socket) = &self.socket {
            config.engine.socket.clone_from(socket);
        }
        if let Some(version) = &self.compose_version {
            config.compose.version.clone_from(version);
        }
        config.compose.create_volumes |= self.create_volumes;
        config.compose.external_networks |= self.external_networks;
    }
}
