//! Logging setup and helpers for the command line tools.

use std::time::Instant;

use tracing::{error, info};

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Runs `f`, logging its duration and outcome.
pub fn log_timed_operation<F, T, E>(operation: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    info!(operation = operation, "Starting operation");

    let result = f();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed"
        ),
        Err(e) => error!(
            operation = operation,
            duration_ms = duration_ms,
            error = %e,
            "Operation failed"
        ),
    }

    result
}
