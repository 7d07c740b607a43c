//! Logging setup with daily files and cleanup
//!
//! Writes to stderr and to `gotbot.YYYY-MM-DD.log`; files older than 7 days are removed on start

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_RETENTION_DAYS: u64 = 7;
const LOG_PREFIX: &str = "gotbot";

pub struct LogManager {
    log_dir: PathBuf,
}

impl LogManager {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn current_log_path(&self) -> PathBuf {
        let today = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir.join(format!("{}.{}.log", LOG_PREFIX, today))
    }

    fn is_log_file(path: &Path) -> bool {
        path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
    }

    /// Deletes log files last modified more than `LOG_RETENTION_DAYS` ago.
    pub fn cleanup_old_logs(&self) -> Result<usize> {
        let cutoff = SystemTime::now() - Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);
        let mut deleted = 0;
        for path in self.log_files()? {
            let modified = fs::metadata(&path)?.modified()?;
            if modified >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => eprintln!("Failed to delete old log {}: {}", path.display(), e),
            }
        }
        Ok(deleted)
    }

    /// Log files, newest first.
    pub fn log_files(&self) -> Result<Vec<PathBuf>> {
        if !self.log_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.log_dir)? {
            let path = entry?.path();
            if Self::is_log_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        files.reverse();
        Ok(files)
    }

    pub fn total_size(&self) -> Result<u64> {
        Ok(self
            .log_files()?
            .iter()
            .filter_map(|file| fs::metadata(file).ok())
            .map(|metadata| metadata.len())
            .sum())
    }

    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

pub struct LoggingGuard {
    _guard: WorkerGuard,
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_logging(log_dir: &Path, log_level: &str) -> Result<LoggingGuard> {
    fs::create_dir_all(log_dir)?;
    let manager = LogManager::new(log_dir.to_path_buf());
    let deleted = manager.cleanup_old_logs()?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(manager.current_log_path())?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(env_filter(log_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_filter(env_filter(log_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    if deleted > 0 {
        tracing::info!(deleted = deleted, "Cleaned up old log files");
    }

    Ok(LoggingGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::LogManager;
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn temp_log_dir(name: &str) -> std::path::PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("gotbot-logs-{}-{}", name, ts));
        fs::create_dir_all(&dir).expect("log dir");
        dir
    }

    #[test]
    fn cleanup_removes_only_stale_gotbot_logs() {
        let dir = temp_log_dir("cleanup");
        let stale = dir.join("gotbot.2020-01-01.log");
        let fresh = dir.join("gotbot.2099-01-01.log");
        let foreign = dir.join("other.2020-01-01.log");
        for path in [&stale, &fresh, &foreign] {
            fs::write(path, "line\n").expect("write");
        }
        let old = SystemTime::now() - Duration::from_secs(10 * 24 * 60 * 60);
        for path in [&stale, &foreign] {
            fs::File::options()
                .write(true)
                .open(path)
                .expect("open")
                .set_modified(old)
                .expect("backdate");
        }

        let manager = LogManager::new(dir.clone());
        assert_eq!(manager.cleanup_old_logs().expect("cleanup"), 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(foreign.exists());
        assert_eq!(manager.log_files().expect("list"), vec![fresh]);
        assert_eq!(manager.total_size().expect("size"), 5);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn current_log_uses_prefix() {
        let manager = LogManager::new(std::path::PathBuf::from("/tmp/x"));
        let name = manager.current_log_path();
        let name = name.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("gotbot.") && name.ends_with(".log"));
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(LogManager::format_size(512), "512 B");
        assert_eq!(LogManager::format_size(2048), "2.00 KB");
        assert_eq!(LogManager::format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let manager = LogManager::new(std::env::temp_dir().join("gotbot-logs-never-created"));
        assert!(manager.log_files().expect("list").is_empty());
    }
}
