//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr
///
/// Log level comes from `RUST_LOG` (default `info,sqlx=warn`). Records the
/// library emits through the `log` facade are forwarded into tracing, and
/// stdout is left to command output.
///
/// # Example
///
/// ```no_run
/// use st_cli::logging;
///
/// logging::init();
/// tracing::info!("Driver starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log how long a storage-backed command took
pub fn log_command(command: &str, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow command"
        );
    } else {
        tracing::debug!(command = command, duration_ms = duration_ms, "Command finished");
    }
}
