//! Diagnostic logging.
//!
//! Everything diagnostic goes to stderr through `tracing`; stdout is reserved
//! for the report itself. `RUST_LOG` wins over `--log-level` when set.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
}

/// Install the global subscriber.
///
/// Calling this twice is an error (the first subscriber stays installed).
pub fn init(level: &str, format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::new(2, format!("Invalid log level '{level}': {e}")))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Compact => subscriber.compact().try_init(),
        LogFormat::Full => subscriber.try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
    };
    installed.map_err(|e| AppError::new(2, format!("Failed to install logger: {e}")))
}
