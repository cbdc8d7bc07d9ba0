use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber, writing plain-text events at `level` or above to
/// `path`. The terminal owns stdout, so there is no console layer.
pub fn try_init_file_logging(path: &Path, level: LevelFilter) -> Result<()> {
    let appender = try_create_appender(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("Failed to install the log subscriber")
}

/// A file appender that never rotates.
fn try_create_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log path {} has no file name", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(anyhow!(
            "Log directory {} does not exist",
            parent.display()
        ));
    }
    Ok(rolling::never(parent, file_name))
}
