//! Log subscriber setup for applications embedding the terrain navigation.
//!
//! The library itself only emits `tracing` events through bevy's log macros.
//! Nothing here runs implicitly: a host either calls [`setup_file_logging`],
//! adds bevy's `LogPlugin`, or scopes its own dispatcher around terrain
//! construction.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::terrain::{TerrainError, TerrainResult};

/// Where and how the file logger writes.
#[derive(Clone, Debug)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub file_prefix: String,
    /// Number of previous log files to keep (including the new one).
    pub keep_count: usize,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "terrain_nav".to_string(),
            keep_count: 25,
            default_filter: "wgpu=error,bevy_render=info,bevy_ecs=info,terrain_nav=info".to_string(),
        }
    }
}

/// Timestamped log file name, e.g. `terrain_nav_20261014_101500.log`.
pub fn log_file_name(prefix: &str, now: chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{}.log", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// Install a global subscriber writing to stdout and a fresh timestamped file.
///
/// Returns the path of the log file. Fails if the directory cannot be created
/// or a global subscriber is already installed.
pub fn setup_file_logging(settings: &LogSettings) -> TerrainResult<PathBuf> {
    if !settings.directory.exists() {
        fs::create_dir_all(&settings.directory)?;
    }

    // Make room for the file we're about to create
    cleanup_old_logs(
        &settings.directory,
        &settings.file_prefix,
        settings.keep_count.saturating_sub(1),
    );

    let log_filename = log_file_name(&settings.file_prefix, chrono::Local::now());
    let log_file_path = settings.directory.join(&log_filename);

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // Don't rotate during a single run
        &settings.directory,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| TerrainError::Logging(e.to_string()))?;

    Ok(log_file_path)
}

/// Delete the oldest `<prefix>*.log` files in `log_dir` so that at most
/// `keep_count` remain. Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str, keep_count: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with(prefix) && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first; the timestamp in the name breaks mtime ties
    log_files.sort_by_key(|e| {
        (
            e.metadata().ok().and_then(|m| m.modified().ok()),
            e.file_name(),
        )
    });

    let mut removed = 0;
    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            if fs::remove_file(file.path()).is_ok() {
                removed += 1;
            }
        }
    }
    removed
}
