use std::sync::Arc;

use clap::Parser;

use autocompose_cli::cli::Cli;
use autocompose_cli::error::CliError;
use autocompose_cli::generate;
use autocompose_cli::logging::init_tracing;
use autocompose_cli::output::OutputTarget;
use autocompose_engine::BollardEngineClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("autocompose: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = generate::load_config(&cli).await?;
    init_tracing(&config.general).map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!(
        engine = %config.engine.kind,
        version = %config.compose.version,
        "configuration loaded"
    );

    let client = Arc::new(BollardEngineClient::connect(&config.engine)?);
    let text = generate::execute(client, &cli, &config).await?;

    OutputTarget::from_option(cli.output.as_deref()).write(&text)
}
