//! Logging initialization.
//!
//! Configures `tracing-subscriber` from the `[general]` section. Every format
//! writes to stderr so that stdout carries nothing but the document.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use autocompose_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
///
/// # Formats
///
/// * `"compact"` - one short line per event (default)
/// * `"pretty"` - multi-line human-readable output
/// * `"json"` - machine-parseable JSON lines
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format.as_str() {
        "compact" => registry.with(layer.compact()).try_init(),
        "pretty" => registry.with(layer.pretty()).try_init(),
        "json" => registry.with(layer.json()).try_init(),
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{other}', expected 'compact', 'pretty' or 'json'"
            ));
        }
    };

    result.map_err(|e| {
        anyhow::anyhow!(
            "failed to initialize {} tracing subscriber: {e}",
            config.log_format
        )
    })
}
