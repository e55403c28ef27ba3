//! Log output goes to the console and a log file at the same time.
//!
//! The console layer writes to stderr so it never interleaves with the
//! MCP stdio transport on stdout.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must be held for the process lifetime.
///
/// # Errors
/// Fails when `log_file` has no file name component.
pub fn init(log_file: &Path) -> io::Result<WorkerGuard> {
    let directory = log_file.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = log_file
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log file has no file name"))?;

    let appender = tracing_appender::rolling::never(
        directory.unwrap_or_else(|| Path::new(".")),
        file_name,
    );
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stock_core=debug,stock_mcp=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}
