//! Shared helpers for keepsafe integration tests.

use std::path::PathBuf;

use keepsafe_core::Config;
use tempfile::TempDir;

/// A config pointing at a store inside a fresh temporary directory.
pub fn temp_store_config() -> (Config, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config {
        store_path: Some(dir.path().join("accounts.db")),
        ..Config::default()
    };
    (config, dir)
}

/// The store path a config resolves to.
pub fn store_path(config: &Config) -> PathBuf {
    keepsafe_core::paths::store_path(config).expect("resolve store path")
}
