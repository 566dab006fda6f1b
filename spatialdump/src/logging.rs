//! Logging setup for the command-line tool.
//!
//! Diagnostics go to stderr through a non-blocking writer, leaving stdout
//! for `--summary` output. Nothing is written to disk.
//! `RUST_LOG` overrides the level derived from the `-v` count.

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes any buffered log lines.
pub struct LoggingGuard {
    _stderr_guard: WorkerGuard,
}

/// Filter directive for a `-v` count.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_logging(verbosity: u8) -> Result<LoggingGuard, TryInitError> {
    let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()?;

    Ok(LoggingGuard {
        _stderr_guard: guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(3), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_level_directives_parse() {
        for v in 0..4 {
            assert!(level_for(v).parse::<tracing::Level>().is_ok());
        }
    }
}
