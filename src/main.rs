use std::io;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use validate_herds::{Cli, ConfigManager, VerbosityLevel};

fn init_logging(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// A verdict of either kind exits with status 0; only a document or schema that
/// cannot be parsed makes the process fail.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let (config, skipped) =
        ConfigManager::load_config(&cli).context("failed to load configuration")?;

    init_logging(config.verbosity());
    for err in &skipped {
        tracing::warn!("ignoring configuration: {}", err);
    }
    tracing::debug!(
        document = %config.document.display(),
        schema = %config.schema.display(),
        "starting validation"
    );

    let stdout = io::stdout();
    let verdict = validate_herds::run(&config, &mut stdout.lock())?;

    tracing::debug!(valid = verdict.is_valid(), "validation finished");
    Ok(())
}
