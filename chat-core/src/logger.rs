//! Tracing initialization: console and log file share one fmt layer with the full
//! format (level, target, span events, all fields).

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::error::{CoreError, Result};

/// Installs the global tracing subscriber, writing to stdout and appending to `log_file_path`.
///
/// The level comes from `RUST_LOG` (e.g. `info`, `debug`, `storage=debug`) and
/// defaults to `info`. Load `.env` (`dotenvy::dotenv()`) before calling this or
/// `RUST_LOG` from the file is ignored. Fails if a global subscriber is already set.
pub fn init_tracing(log_file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CoreError::Logger(format!("Failed to set global subscriber: {}", e)))?;

    Ok(())
}
