//! Error types for store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while working with the encrypted store.
///
/// Every fallible vault operation returns one of these; nothing is retried
/// or swallowed. The command dispatcher is responsible for releasing the
/// lock on any propagation path.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    PathResolution(#[from] keepsafe_core::ConfigError),

    #[error("store is locked (remove {0} if stale)")]
    LockHeld(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("security check failed: {0}")]
    SecurityCheck(String),

    #[error("crypto engine unavailable: {0}")]
    CryptoInit(String),

    #[error("key not usable: {0}")]
    CryptoKey(String),

    #[error("crypto operation failed: {0}")]
    CryptoOperation(String),

    #[error("signature verification failed: {0}")]
    Verification(String),

    #[error("store is not well-formed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("account '{0}' not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Exists(String),
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
