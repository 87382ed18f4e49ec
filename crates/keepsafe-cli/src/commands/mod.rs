//! Command handlers.

pub mod account;
pub mod check;
pub mod security;
pub mod store;

use keepsafe_core::Config;
use keepsafe_vault::Session;

/// Run a command body against a fresh session.
///
/// Installs an interrupt handler that releases the lock if this process
/// owns it, and releases the lock on every return path (release is
/// idempotent, and the session's `Drop` backstops panics).
pub(crate) fn with_session<T>(
    config: &Config,
    f: impl FnOnce(&mut Session) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut session = Session::new(config)?;

    let handle = session.lock_handle();
    ctrlc::set_handler(move || {
        handle.release_if_held();
        std::process::exit(130);
    })?;

    let result = f(&mut session);
    session.unload();
    result
}

/// Print a success confirmation on stderr unless `--quiet` is set.
pub(crate) fn confirm(config: &Config, message: impl AsRef<str>) {
    if !config.quiet {
        eprintln!("{}", message.as_ref());
    }
}
