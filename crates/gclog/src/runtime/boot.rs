//! Boot — config load and logging init.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{ConfigError, ReaderConfig};
use crate::runtime::cli::Cli;

/// Initialise the tracing / logging subsystem.
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr, stdout carries
/// the parsed output.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config (file, env, then command line) and start logging.
pub fn boot(cli: &Cli) -> Result<ReaderConfig, ConfigError> {
    let mut config = ReaderConfig::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output = output;
    }

    init_logging(&config.log_filter);
    info!("Starting gclog v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Reassembly limits: max_line_length={}, max_pending_fragments={}",
        config.reassembly.max_line_length, config.reassembly.max_pending_fragments
    );

    Ok(config)
}
