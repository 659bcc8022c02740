use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive for the life of the process.
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

fn env_filter(debug: bool) -> EnvFilter {
    // Without debug logging we force `info` regardless of `RUST_LOG` so a stray
    // variable in the user's environment cannot turn on verbose output.
    let level = if debug { "debug" } else { "info" };
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dashboard.log".into());
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

/// Build the subscriber used by [`init`]. When `log_file` is set output goes
/// to that file through a non-blocking writer whose guard is returned.
pub fn subscriber(
    debug: bool,
    log_file: Option<&Path>,
) -> (impl tracing::Subscriber + Send + Sync, Option<WorkerGuard>) {
    let appender = log_file.and_then(|path| match file_appender(path) {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", path.display());
            None
        }
    });
    let (writer, guard, ansi) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(writer)
        .with_ansi(ansi)
        .finish();
    (subscriber, guard)
}

/// Initialise logging. The default level is `info`; `debug` enables debug
/// output and lets `RUST_LOG` override the level. Calling this more than once
/// keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let (subscriber, guard) = subscriber(debug, log_file.as_deref());
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        if let Some(guard) = guard {
            let _ = LOG_GUARD.set(guard);
        }
    }
}
