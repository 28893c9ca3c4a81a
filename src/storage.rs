//! File helpers for the work log.
//!
//! The log is rewritten whole on every mutating command. Writes go to a
//! sibling temp file first and are renamed over the target, so a crash leaves
//! either the old log or the new one.
//!
//! There is no locking: two invocations against the same file race and the
//! last writer wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

/// Write data atomically using temp file + rename
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Atomically write string data to a file
pub fn write_atomic_str(path: impl AsRef<Path>, data: &str) -> Result<()> {
    write_atomic(path, data.as_bytes())
}

/// Pick the backing file: explicit flag/env value first, then the config.
pub fn resolve_log_path(explicit: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    explicit
        .or_else(|| config.log_file.clone())
        .ok_or(Error::MissingLogFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("log.toml");

        write_atomic_str(&file_path, "version = \"0.0.0\"\n").unwrap();
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "version = \"0.0.0\"\n"
        );

        write_atomic_str(&file_path, "version = \"0.0.1\"\n").unwrap();
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "version = \"0.0.1\"\n"
        );

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("dir").join("log.toml");
        write_atomic_str(&file_path, "x = 1\n").unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let mut config = Config::default();
        config.log_file = Some(PathBuf::from("/from/config.toml"));

        let explicit = resolve_log_path(Some(PathBuf::from("/explicit.toml")), &config).unwrap();
        assert_eq!(explicit, PathBuf::from("/explicit.toml"));

        let fallback = resolve_log_path(None, &config).unwrap();
        assert_eq!(fallback, PathBuf::from("/from/config.toml"));

        let missing = resolve_log_path(None, &Config::default()).unwrap_err();
        assert!(matches!(missing, Error::MissingLogFile));
    }
}
