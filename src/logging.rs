use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Where log lines go besides the rolling file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// File only; the TUI owns the terminal.
    File,
    /// File and stderr.
    FileAndStderr,
}

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("procbar").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default
/// `procbar=info`.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// stops the background writer.
pub fn init_logging(target: LogTarget) -> Option<WorkerGuard> {
    let dir = log_dir();
    let file = match std::fs::create_dir_all(&dir) {
        Ok(()) => Some(tracing_appender::non_blocking(
            tracing_appender::rolling::daily(&dir, "procbar.log"),
        )),
        Err(e) => {
            eprintln!("procbar: cannot create log directory {}: {}", dir.display(), e);
            None
        }
    };
    let (file_writer, guard) = match file {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });
    let stderr_layer = (target == LogTarget::FileAndStderr).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .ok();

    guard
}
