//! Diagnostic tracing setup.
//!
//! Diagnostics go to stderr so that stdout carries only the thread output.
//! The audit log (`[audit]` in the config) is separate and is written
//! regardless of verbosity.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `-v` when set. With `log_dir`, logs are also written
/// to daily-rotated `policy-rewriter.log.*` files; keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "policy-rewriter.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
