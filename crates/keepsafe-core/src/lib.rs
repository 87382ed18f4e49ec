//! # keepsafe-core
//!
//! Shared foundation for the keepsafe credential store:
//!
//! - **Configuration**: the immutable per-invocation [`Config`] value
//! - **Paths**: store, lock-sentinel, and backup path resolution
//! - **Secrets**: [`SecretString`], a zero-on-drop string for credentials

pub mod config;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
