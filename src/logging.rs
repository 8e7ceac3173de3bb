use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. The process normally runs without a console, so log
/// lines go to a daily rolling file next to the settings. The default level
/// is `info`; `debug` is enabled via the settings file, and only then does
/// `RUST_LOG` get a say.
pub fn init(debug: bool, log_dir: &std::path::Path) {
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let appender = tracing_appender::rolling::daily(log_dir, "folder_memo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}
