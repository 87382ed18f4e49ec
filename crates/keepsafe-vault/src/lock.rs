//! Advisory lock on the store file.
//!
//! The lock is a zero-length sentinel at `<store>.lock`; its existence *is*
//! the lock state. Acquisition is a single exclusive-create open, so two
//! concurrent invocations cannot both observe "unlocked" and proceed.
//! The sentinel must exist for the whole interval between a successful
//! acquire and the matching release, including on error exits, which is why
//! release is idempotent and cheap to call from every cleanup path.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use keepsafe_core::paths;

use crate::error::{Result, VaultError};

/// Manages the lock sentinel for one store path.
pub struct LockManager {
    lock_path: PathBuf,
    held: Arc<AtomicBool>,
}

impl LockManager {
    /// Create a manager for the store at `store_path`.
    pub fn new(store_path: &Path) -> Self {
        Self {
            lock_path: paths::lock_path(store_path),
            held: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Acquire the lock by creating the sentinel.
    ///
    /// Uses an atomic create-if-absent open; fails with
    /// [`VaultError::LockHeld`] when the sentinel already exists.
    pub fn acquire(&self) -> Result<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
        {
            Ok(_) => {
                debug!(path = %self.lock_path.display(), "lock acquired");
                self.held.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(VaultError::LockHeld(self.lock_path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Release the lock by deleting the sentinel.
    ///
    /// Idempotent: a missing sentinel is not an error, so cleanup paths may
    /// release unconditionally.
    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        match std::fs::remove_file(&self.lock_path) {
            Ok(()) => debug!(path = %self.lock_path.display(), "lock released"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.lock_path.display(), "could not remove lock sentinel: {e}")
            }
        }
    }

    /// Whether the sentinel currently exists (regardless of owner).
    pub fn is_locked(&self) -> bool {
        self.lock_path.exists()
    }

    /// Whether this manager currently owns the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// A handle that can release this manager's lock from a signal handler.
    pub fn handle(&self) -> LockHandle {
        LockHandle {
            lock_path: self.lock_path.clone(),
            held: Arc::clone(&self.held),
        }
    }
}

/// Cheap cloneable reference to a [`LockManager`]'s lock state.
///
/// An interrupt delivered mid-command must release the lock before the
/// process exits; the handler runs on its own thread, so it gets this
/// handle instead of the manager itself.
#[derive(Clone)]
pub struct LockHandle {
    lock_path: PathBuf,
    held: Arc<AtomicBool>,
}

impl LockHandle {
    /// Remove the sentinel if this process owns it.
    ///
    /// Never touches a sentinel created by another invocation.
    pub fn release_if_held(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PathBuf {
        dir.path().join("accounts.db")
    }

    #[test]
    fn test_acquire_creates_sentinel() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let lock = LockManager::new(&store);

        assert!(!lock.is_locked());
        lock.acquire().unwrap();
        assert!(lock.is_locked());
        assert!(lock.is_held());

        let sentinel = tmp.path().join("accounts.db.lock");
        assert!(sentinel.exists());
        assert_eq!(std::fs::metadata(&sentinel).unwrap().len(), 0);
    }

    #[test]
    fn test_second_acquire_fails_and_keeps_lock() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let lock = LockManager::new(&store);

        lock.acquire().unwrap();
        let second = lock.acquire();
        assert!(matches!(second, Err(VaultError::LockHeld(_))));
        // Still locked by the original owner.
        assert!(lock.is_locked());
    }

    #[test]
    fn test_acquire_fails_across_managers() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let first = LockManager::new(&store);
        let second = LockManager::new(&store);

        first.acquire().unwrap();
        assert!(matches!(second.acquire(), Err(VaultError::LockHeld(_))));
    }

    #[test]
    fn test_release_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let lock = LockManager::new(&store);

        lock.acquire().unwrap();
        lock.release();
        assert!(!lock.is_locked());

        // Double release from a cleanup path must be a no-op.
        lock.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_then_reacquire() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let lock = LockManager::new(&store);

        lock.acquire().unwrap();
        lock.release();
        lock.acquire().unwrap();
        assert!(lock.is_locked());
    }

    #[test]
    fn test_handle_releases_only_owned_lock() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let owner = LockManager::new(&store);
        let bystander = LockManager::new(&store);

        owner.acquire().unwrap();

        // A handle from a manager that never acquired must not unlock.
        bystander.handle().release_if_held();
        assert!(owner.is_locked());

        owner.handle().release_if_held();
        assert!(!owner.is_locked());
    }
}
