//! Log setup. The TUI owns the terminal, so log output goes to a file
//! under the quill home directory instead of stderr.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

/// Filter env var, same syntax as `RUST_LOG` (e.g. `quill=debug`).
pub const LOG_ENV: &str = "QUILL_LOG";

const DEFAULT_FILTER: &str = "quill=info";

/// Initializes tracing with a non-blocking file writer under
/// `<quill home>/logs/`. The returned guard must be held for the life of
/// the process; dropping it flushes and stops the writer thread.
pub fn init() -> Result<WorkerGuard> {
    init_at(&paths::logs_dir())
}

pub fn init_at(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create log directory: {}", logs_dir.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let appender = tracing_appender::rolling::daily(logs_dir, "quill.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
