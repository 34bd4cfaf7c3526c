//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use warden_config::LoggingConfig;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns `Ok(false)`
/// when a global subscriber was already installed.
///
/// # Errors
///
/// Returns an error when `config.filter` is not a valid filter directive.
pub fn init(config: &LoggingConfig) -> Result<bool, ParseError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok())
}
