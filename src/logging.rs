//! Structured tracing setup.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go. The terminal UI owns stdout, so interactive runs log to a file.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`). Setting
/// `SIMULATOR_TRACE_JSON=1` switches to JSON lines.
pub fn init_tracing(target: LogTarget) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIMULATOR_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    match target {
        LogTarget::Stderr if use_json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_thread_names(true)
                    .with_current_span(true),
            )
            .init(),
        LogTarget::Stderr => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .init(),
        LogTarget::File(path) => {
            let writer = Mutex::new(File::create(&path)?);
            if use_json {
                registry
                    .with(
                        fmt::layer()
                            .json()
                            .with_writer(writer)
                            .with_ansi(false)
                            .with_thread_names(true),
                    )
                    .init();
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false)
                            .with_thread_names(true),
                    )
                    .init();
            }
        }
    }

    info!(json = use_json, "Structured tracing initialized");
    Ok(())
}
