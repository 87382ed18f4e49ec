//! The encrypted-document session.
//!
//! A [`Session`] composes path resolution, the advisory lock, the crypto
//! backend, and the backup manager into the operations the command layer
//! consumes: `create`, `load`, `sync`, `unload`, `delete`. The lock is held
//! from a successful `create`/`load` until `unload` (or `delete`); every
//! failure path releases it, and the `Drop` impl backstops any path the
//! command layer misses.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use keepsafe_core::{paths, Config};

use crate::backup;
use crate::crypto::{Ciphertext, CryptoBackend};
use crate::document::Document;
use crate::error::{Result, VaultError};
use crate::lock::{LockHandle, LockManager};

/// One store session: exclusive access to the encrypted file at a resolved
/// path, for the duration of a single command.
pub struct Session {
    store_path: PathBuf,
    lock: LockManager,
    crypto: CryptoBackend,
    backup_enabled: bool,
}

impl Session {
    /// Resolve paths and bind the crypto backend for this invocation.
    ///
    /// Does not touch the store or the lock; `create`/`load` do that.
    pub fn new(config: &Config) -> Result<Self> {
        let store_path = paths::store_path(config)?;
        Ok(Self {
            lock: LockManager::new(&store_path),
            crypto: CryptoBackend::new(config),
            backup_enabled: config.backup,
            store_path,
        })
    }

    /// The resolved store path.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Handle for releasing the lock from an interrupt handler.
    pub fn lock_handle(&self) -> LockHandle {
        self.lock.handle()
    }

    /// Create a new, empty store.
    ///
    /// Refuses to clobber an existing file. On success the placeholder file
    /// exists, the lock is held, and the returned document is empty; the
    /// caller is expected to `sync` and then `unload`.
    pub fn create(&mut self) -> Result<Document> {
        if let Some(parent) = self.store_path.parent() {
            // Only newly created directories get their mode tightened; an
            // existing parent (e.g. the home directory itself) is left alone.
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
                }
            }
        }

        self.lock.acquire()?;

        if self.store_path.exists() {
            self.lock.release();
            return Err(VaultError::Exists(format!(
                "store '{}'",
                self.store_path.display()
            )));
        }

        if let Err(e) = self.write_store(&[]) {
            self.lock.release();
            return Err(e);
        }

        debug!(path = %self.store_path.display(), "store created");
        Ok(Document::new_empty())
    }

    /// Load and decrypt the store.
    ///
    /// Acquires the lock first; any failure after that releases it before
    /// propagating, so a failed load never leaves an orphaned sentinel.
    pub fn load(&mut self) -> Result<Document> {
        self.lock.acquire()?;

        let document = (|| {
            let raw = fs::read(&self.store_path)?;
            let plaintext = self.crypto.decrypt_verify(&Ciphertext::from_bytes(raw))?;
            Document::parse(&plaintext)
        })();

        match document {
            Ok(doc) => {
                debug!(accounts = doc.len(), "store loaded");
                Ok(doc)
            }
            Err(e) => {
                self.lock.release();
                Err(e)
            }
        }
    }

    /// Snapshot the encrypted file ahead of a mutating command.
    ///
    /// No-op when backups are disabled by configuration. Must be called
    /// before `load`, so the snapshot reflects the pre-command state.
    pub fn backup(&self) -> Result<()> {
        if !self.backup_enabled {
            return Ok(());
        }
        backup::snapshot(&self.store_path)
    }

    /// Re-encrypt the document and overwrite the store file.
    ///
    /// The ciphertext is fully built before the file is touched, so a
    /// serialization or crypto failure leaves the previous bytes intact.
    pub fn sync(&mut self, document: &Document) -> Result<()> {
        let plaintext = document.serialize_compact()?;
        let ciphertext = self.crypto.encrypt_sign(&plaintext)?;
        self.write_store(ciphertext.as_bytes())?;
        debug!(accounts = document.len(), "store synced");
        Ok(())
    }

    /// Discard the in-memory document and release the lock.
    pub fn unload(&mut self) {
        self.lock.release();
    }

    /// Remove the store file entirely and release the lock.
    ///
    /// Used to roll back a `create` whose initial sync failed.
    pub fn delete(&mut self) -> Result<()> {
        let removed = fs::remove_file(&self.store_path);
        self.lock.release();
        match removed {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_store(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.store_path, bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.store_path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Mandatory cleanup: whatever path unwinds out of a command, the
        // sentinel must not outlive the session that created it.
        if self.lock.is_held() {
            self.lock.release();
        }
    }
}
