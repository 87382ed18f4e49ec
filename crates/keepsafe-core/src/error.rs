//! Error types for keepsafe core.

use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration and path-resolution errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve store path: {0}")]
    PathResolution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
