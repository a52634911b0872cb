// Tracing log adapter - Structured logging using the tracing crate

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::domain::errors::*;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
/// applied to this crate only.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clipkun={0},clipkun_cli={0}", level)))
}

/// Install the global subscriber. Output goes to stderr so stdout only
/// carries command results.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), DomainError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| DomainError::Config(format!("Failed to initialize logging: {}", e)))
}
