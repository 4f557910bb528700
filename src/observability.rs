//! Logging helpers.

use std::fs;
use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "passkeep.log";
const DEFAULT_FILTER: &str = "passkeep_lib=info,passkeep=info";

/// Sends vault logs to a daily rolling file in `log_dir`.
///
/// Returns false when a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_tracing(log_dir: &Path) -> bool {
    let _ = fs::create_dir_all(log_dir);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(log_dir = %log_dir.display(), "logging started");
    }
    installed
}
