// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Console output is always installed. With the `file-logging` feature and a
//! `log_dir`, a JSON log file is also written into a timestamped run folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

/// Keeps background log writers alive; drop it last.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder holding the log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the `EnvFilter` for the given flags.
///
/// `RUST_LOG` takes precedence when set; otherwise per-crate flags are layered
/// over `default_level`.
pub fn build_env_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Initialize logging
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `options` - Level, console format and optional file output
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(debug_flags, &options.level)?;

    let mut layers = Vec::new();

    let console_layer = match options.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let mut file_guards = Vec::new();
    #[allow(unused_mut)]
    let mut run_folder: Option<PathBuf> = None;

    #[cfg(feature = "file-logging")]
    if let Some(base_log_dir) = &options.log_dir {
        let folder = file::create_run_folder(base_log_dir)?;
        file::cleanup_old_logs(base_log_dir, options.retention_days, options.retention_runs)?;

        let appender = tracing_appender::rolling::never(&folder, "gaze-emulator.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        file_guards.push(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(build_env_filter(debug_flags, &options.level)?)
            .boxed();
        layers.push(file_layer);
        run_folder = Some(folder);
    }

    #[cfg(not(feature = "file-logging"))]
    if options.log_dir.is_some() {
        eprintln!("Warning: log_dir ignored, built without the 'file-logging' feature");
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir: run_folder,
    })
}

/// Initialize console logging at the given default level
pub fn init_logging_default(debug_flags: &CrateDebugFlags, level: &str) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingOptions::with_level(level))
}

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{NaiveDateTime, Utc};

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    pub(super) fn create_run_folder(base_log_dir: &Path) -> Result<PathBuf> {
        let timestamp = Utc::now().format(RUN_FORMAT);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
        Ok(run_folder)
    }

    /// Remove run folders older than `retention_days`, then trim to the newest `retention_runs`
    pub(super) fn cleanup_old_logs(
        base_log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff = Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_FORMAT).ok());
            if let Some(stamp) = stamp {
                runs.push((path, stamp));
            }
        }

        // Oldest first
        runs.sort_by_key(|(_, stamp)| *stamp);

        let (expired, kept): (Vec<_>, Vec<_>) =
            runs.into_iter().partition(|(_, stamp)| *stamp < cutoff);
        let excess = kept.len().saturating_sub(retention_runs);

        for (path, _) in expired.iter().chain(kept.iter().take(excess)) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cleanup_keeps_most_recent_runs() {
            let dir = tempfile::tempdir().unwrap();
            let now = Utc::now();
            for minutes in 0..5 {
                let stamp = (now - chrono::Duration::minutes(minutes)).format(RUN_FORMAT);
                std::fs::create_dir_all(dir.path().join(format!("{}{}", RUN_PREFIX, stamp))).unwrap();
            }
            std::fs::create_dir_all(dir.path().join("unrelated")).unwrap();

            cleanup_old_logs(dir.path(), 30, 2).unwrap();

            let remaining: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect();
            assert_eq!(remaining.iter().filter(|n| n.starts_with(RUN_PREFIX)).count(), 2);
            assert!(remaining.contains(&"unrelated".to_string()));
        }

        #[test]
        fn test_cleanup_removes_expired_runs() {
            let dir = tempfile::tempdir().unwrap();
            let old = (Utc::now() - chrono::Duration::days(90)).format(RUN_FORMAT);
            let old_path = dir.path().join(format!("{}{}", RUN_PREFIX, old));
            std::fs::create_dir_all(&old_path).unwrap();

            cleanup_old_logs(dir.path(), 30, 10).unwrap();

            assert!(!old_path.exists());
        }
    }
}
