//! Tracing initialisation for hosts embedding the matrix runner.
//!
//! The global subscriber can only be set once per process; later calls
//! report `false` and leave the first subscriber in place.

use crate::config::MatrixConfig;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global subscriber filtered by `RUST_LOG` (falling back to
/// `level`), writing plain or JSON lines. Returns whether it was installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let (plain, structured) = if json {
        (None, Some(fmt::layer().with_target(false).json()))
    } else {
        (Some(fmt::layer().with_target(false)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .try_init()
        .is_ok()
}

/// [`init_tracing`] at `INFO`, with the format chosen by `config`.
pub fn init_from_config(config: &MatrixConfig) -> bool {
    init_tracing(config.log_json, Level::INFO)
}
