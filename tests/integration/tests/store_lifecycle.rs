//! Store lifecycle integration tests.
//!
//! Exercise the session, lock, and backup machinery end to end. Crypto is
//! kept out of the loop (the crypto round trip needs a provisioned keyring
//! and is covered by an ignored test in keepsafe-vault); here the encrypted
//! file is stood in for by fixed bytes.

use std::fs;

use keepsafe_integration_tests::{store_path, temp_store_config};
use keepsafe_vault::{Session, VaultError};

#[test]
fn test_create_then_recreate_is_refused() {
    let (config, _dir) = temp_store_config();
    let store = store_path(&config);

    let mut session = Session::new(&config).unwrap();
    session.create().unwrap();
    session.unload();
    assert!(store.exists());

    // Second create must refuse and leave the first store untouched.
    let before = fs::read(&store).unwrap();
    let mut second = Session::new(&config).unwrap();
    assert!(matches!(second.create(), Err(VaultError::Exists(_))));
    assert_eq!(fs::read(&store).unwrap(), before);
}

#[test]
fn test_lock_guards_across_sessions() {
    let (config, _dir) = temp_store_config();

    let mut holder = Session::new(&config).unwrap();
    holder.create().unwrap();

    // While the first session holds the lock, a second invocation cannot
    // load, and its failure does not steal or drop the sentinel.
    let mut intruder = Session::new(&config).unwrap();
    assert!(matches!(intruder.load(), Err(VaultError::LockHeld(_))));

    holder.unload();

    // After release, the path is free again (load now fails on decrypt
    // rather than on the lock, since the placeholder is not a real
    // ciphertext -- but it must not fail with LockHeld).
    let mut third = Session::new(&config).unwrap();
    assert!(!matches!(third.load(), Err(VaultError::LockHeld(_))));
}

#[test]
fn test_failed_load_leaves_no_sentinel() {
    let (config, _dir) = temp_store_config();
    let store = store_path(&config);

    // No store file at all: load must fail and release.
    let mut session = Session::new(&config).unwrap();
    assert!(session.load().is_err());

    let sentinel = store.with_file_name(format!(
        "{}.lock",
        store.file_name().unwrap().to_string_lossy()
    ));
    assert!(!sentinel.exists());
}

#[test]
fn test_backup_precedes_mutation() {
    let (config, _dir) = temp_store_config();
    let store = store_path(&config);

    fs::write(&store, b"ciphertext before mutation").unwrap();

    let session = Session::new(&config).unwrap();
    session.backup().unwrap();

    // The snapshot holds the pre-command bytes even after the store is
    // overwritten by a later sync.
    fs::write(&store, b"ciphertext after mutation").unwrap();

    let backup = store.with_file_name(format!(
        "{}~",
        store.file_name().unwrap().to_string_lossy()
    ));
    assert_eq!(fs::read(&backup).unwrap(), b"ciphertext before mutation");
}

#[test]
fn test_delete_clears_store_and_sentinel() {
    let (config, _dir) = temp_store_config();
    let store = store_path(&config);

    let mut session = Session::new(&config).unwrap();
    session.create().unwrap();
    session.delete().unwrap();

    assert!(!store.exists());
    let sentinel = store.with_file_name(format!(
        "{}.lock",
        store.file_name().unwrap().to_string_lossy()
    ));
    assert!(!sentinel.exists());
}
