use std::path::Path;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes tracing with a daily-rolling file appender and an optional
/// stdout layer. The returned guard must be held for the process lifetime or
/// buffered log lines are dropped.
pub fn init(log_file: &str, log_level: &str, log_to_stdout: bool) -> WorkerGuard {
    let path = Path::new(log_file);
    let dir = path.parent().unwrap_or_else(|| Path::new("logs"));
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "api.log".into());

    std::fs::create_dir_all(dir).ok();

    let file_appender = rolling::daily(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let env_filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_owned()));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if log_to_stdout {
        registry
            .with(fmt::layer().with_writer(std::io::stdout).with_ansi(true))
            .init();
    } else {
        registry.init();
    }

    guard
}
