//! # keepsafe-vault
//!
//! The encrypted-document session for the keepsafe credential store:
//!
//! - **Document**: the in-memory account mapping and its operations
//! - **Lock**: the advisory sentinel guarding cross-invocation access
//! - **Crypto**: armored encrypt-sign / decrypt-verify via the OpenPGP
//!   keyring
//! - **Backup**: byte-identical snapshot before every mutation
//! - **Security**: the preflight hardening gate
//! - **Session**: the orchestrator tying the above together

pub mod backup;
pub mod crypto;
pub mod document;
pub mod error;
pub mod lock;
pub mod security;
pub mod session;

pub use crypto::{Ciphertext, CryptoBackend};
pub use document::{AccountRecord, Document};
pub use error::{Result, VaultError};
pub use lock::{LockHandle, LockManager};
pub use security::{run_checks, SecurityReport};
pub use session::Session;
