//! Logging initialization and the output log capability.
//!
//! Diagnostics go to stderr so they never mix with shell output on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "shell_bridge=info";

/// Target used by [`TracingOutputLog`].
pub const OUTPUT_TARGET: &str = "shell_bridge::output";

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    try_init_with(filter)
}

/// Initialize logging with an explicit filter such as `debug` or
/// `shell_bridge=trace`. Falls back to the default filter if `directives`
/// does not parse.
pub fn try_init_with_filter(
    directives: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    try_init_with(filter)
}

fn try_init_with(filter: EnvFilter) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

/// Destination for driver-emitted shell output.
pub trait OutputLog: Send + Sync {
    /// Record one piece of output.
    fn log(&self, text: &str);
}

/// Emits output as `info` events under [`OUTPUT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutputLog;

impl OutputLog for TracingOutputLog {
    fn log(&self, text: &str) {
        tracing::info!(target: OUTPUT_TARGET, "{}", text);
    }
}

/// Drops all output. Used when output is already written elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardOutputLog;

impl OutputLog for DiscardOutputLog {
    fn log(&self, _text: &str) {}
}

impl<F> OutputLog for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, text: &str) {
        self(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_try_init_idempotent() {
        let _ = try_init();
        let _ = try_init();
    }

    #[test]
    fn test_try_init_with_bad_filter() {
        // Falls back to the default filter; may fail only because a
        // subscriber is already installed.
        let _ = try_init_with_filter("not a [valid filter");
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init();

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        TracingOutputLog.log("test output line");
    }

    #[test]
    fn test_closure_output_log() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let log = move |text: &str| sink.lock().unwrap().push_str(text);

        log.log("a");
        OutputLog::log(&log, "b");
        assert_eq!(*seen.lock().unwrap(), "ab");
    }
}
