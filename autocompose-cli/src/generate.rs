//! The one thing the binary does: load settings, inspect, render.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use autocompose_core::config::AutocomposeConfig;
use autocompose_engine::ContainerEngineClient;
use autocompose_mapper::{ComposeGenerator, GenerateOptions};

use crate::cli::Cli;
use crate::error::CliError;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "autocompose.toml";

/// Resolves the effective configuration.
///
/// An explicit `--config` file must exist. Without one, `autocompose.toml`
/// in the working directory is used if present, defaults otherwise.
/// Environment overrides and then command-line flags are applied on top.
pub async fn load_config(cli: &Cli) -> Result<AutocomposeConfig, CliError> {
    load_config_from(cli, Path::new(DEFAULT_CONFIG_PATH)).await
}

/// [`load_config`] with an explicit fallback location.
pub async fn load_config_from(
    cli: &Cli,
    fallback: &Path,
) -> Result<AutocomposeConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => AutocomposeConfig::load(path).await?,
        None if fallback.exists() => AutocomposeConfig::load(fallback).await?,
        None => AutocomposeConfig::from_env()?,
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Checks the engine, generates the document and renders it.
///
/// # Errors
///
/// - `CliError::EngineUnavailable` when the engine does not answer
/// - `CliError::NothingFound` when none of the requested containers exist
pub async fn execute<C: ContainerEngineClient>(
    client: Arc<C>,
    cli: &Cli,
    config: &AutocomposeConfig,
) -> Result<String, CliError> {
    client.ping().await?;

    let generator = ComposeGenerator::new(client, GenerateOptions::from(&config.compose));
    let report = generator.generate(&cli.selection()).await?;

    if report.rendered == 0 && !report.skipped_containers.is_empty() {
        return Err(CliError::NothingFound(report.skipped_containers));
    }
    for name in &report.skipped_containers {
        warn!(container = %name, "there's no container with this name or id");
    }
    info!(services = report.rendered, "rendering document");

    Ok(report.document.render(cli.format.into())?)
}
