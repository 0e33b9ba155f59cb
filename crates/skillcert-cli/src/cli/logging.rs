//! Tracing setup.
//!
//! Logs go to stderr, filtered by `SKILLCERT_LOG` (default `warn`). With
//! `[log] file = true` they are also appended to a daily file under
//! `<home>/logs`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use skillcert_core::config::{Config, paths};

pub const LOG_ENV: &str = "SKILLCERT_LOG";

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if config.log.file {
        let appender = tracing_appender::rolling::daily(paths::logs_dir(), "skillcert.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file = fmt::layer().with_writer(writer).with_ansi(false);
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .with(file)
            .try_init();
        installed.is_ok().then_some(guard)
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .try_init();
        None
    }
}
