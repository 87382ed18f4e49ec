//! Store, lock, and backup path resolution.
//!
//! All paths derive from a single store path, which comes from the
//! configuration override or defaults to `~/.config/keepsafe/accounts.db`.
//! Resolution is a pure function of the configuration; nothing here touches
//! the filesystem.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;

/// File name of the default store, under the default config directory.
const STORE_FILE: &str = "accounts.db";

/// Resolve the store path from the configuration.
///
/// An explicit override wins (with `~/` expanded); otherwise the default
/// location under the user's home directory is used.
pub fn store_path(config: &Config) -> Result<PathBuf, ConfigError> {
    match &config.store_path {
        Some(path) => Ok(expand_tilde(&path.to_string_lossy())),
        None => default_store_path(),
    }
}

/// Get the default store path (`~/.config/keepsafe/accounts.db`).
pub fn default_store_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::PathResolution("could not determine home directory".to_string())
    })?;
    Ok(home.join(".config").join("keepsafe").join(STORE_FILE))
}

/// Get the lock sentinel path for a store (`<store>.lock`).
pub fn lock_path(store: &Path) -> PathBuf {
    append_suffix(store, ".lock")
}

/// Get the backup snapshot path for a store (`<store>~`).
pub fn backup_path(store: &Path) -> PathBuf {
    append_suffix(store, "~")
}

/// Expand a leading tilde (`~/`) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Append a literal suffix to a path, keeping any extension intact.
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_path() {
        let path = default_store_path().unwrap();
        assert!(path.ends_with(".config/keepsafe/accounts.db"));
    }

    #[test]
    fn test_store_path_override() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/other.db")),
            ..Config::default()
        };
        assert_eq!(store_path(&config).unwrap(), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_lock_path_appends_to_full_name() {
        let lock = lock_path(Path::new("/tmp/accounts.db"));
        assert_eq!(lock, PathBuf::from("/tmp/accounts.db.lock"));
    }

    #[test]
    fn test_backup_path_appends_tilde() {
        let backup = backup_path(Path::new("/tmp/accounts.db"));
        assert_eq!(backup, PathBuf::from("/tmp/accounts.db~"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/store.db");
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.ends_with("store.db"));
    }

    #[test]
    fn test_expand_tilde_absolute_unchanged() {
        assert_eq!(expand_tilde("/var/store.db"), PathBuf::from("/var/store.db"));
    }
}
