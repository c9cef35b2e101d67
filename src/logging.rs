//! `tracing` subscriber setup.
//!
//! The TUI owns the terminal, so it logs to a file in the config directory;
//! the headless `export` command logs to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

/// `RUST_LOG` wins over `level` when set.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call is ignored.
pub fn init(level: &str, target: LogTarget<'_>) -> std::io::Result<()> {
    let builder = fmt().with_env_filter(filter(level)).with_target(true);
    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Stderr => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back() {
        // An unparsable directive must not panic.
        let _ = filter("=[");
    }

    #[test]
    fn file_target_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/user-admin.log");
        init("debug", LogTarget::File(&path)).unwrap();
        assert!(path.exists());
    }
}
