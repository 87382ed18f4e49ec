//! Pre-mutation snapshot of the encrypted store file.

use std::fs;
use std::path::Path;

use tracing::debug;

use keepsafe_core::paths;

use crate::error::Result;

/// Copy the encrypted store byte-for-byte to `<store>~`.
///
/// Runs before a mutating command's load; a failure here is fatal to the
/// command, since a subsequent sync would make the prior state
/// unrecoverable.
pub fn snapshot(store_path: &Path) -> Result<()> {
    let backup_path = paths::backup_path(store_path);
    fs::copy(store_path, &backup_path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("could not back up '{}': {e}", store_path.display()),
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&backup_path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %backup_path.display(), "store snapshot written");
    Ok(())
}
