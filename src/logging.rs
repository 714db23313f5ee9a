//! Diagnostic logging.
//!
//! The kiosk owns the whole screen, so log lines never go to stdout or
//! stderr. They are appended to a file instead. `RUST_LOG` overrides the
//! configured level.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// File name used when no log path is given.
const LOG_FILE_NAME: &str = "kiosk.log";

/// Default log location: the user cache dir, or the temp dir if there is none.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("fortune-kiosk")
        .join(LOG_FILE_NAME)
}

/// Install the global subscriber writing to `path`.
///
/// Creates parent directories as needed. Calling it twice is harmless;
/// the second subscriber is ignored.
pub fn init_logging(path: &Path, level: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_path_ends_with_log_file() {
        let path = default_log_path();
        assert!(path.ends_with("fortune-kiosk/kiosk.log"));
    }

    #[test]
    fn test_init_creates_log_file_and_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("kiosk.log");

        init_logging(&path, "debug").unwrap();

        assert!(path.exists());
    }
}
