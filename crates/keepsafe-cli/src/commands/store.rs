//! Whole-store commands: create and dump.

use std::io::Write;

use keepsafe_core::{paths, Config};

use super::{confirm, with_session};

/// Create a new, empty store at the resolved path.
pub fn create(config: &Config) -> anyhow::Result<()> {
    let store = paths::store_path(config)?;

    with_session(config, |session| {
        let doc = session.create()?;
        if let Err(e) = session.sync(&doc) {
            // Roll the placeholder back so a retry is not refused.
            let _ = session.delete();
            return Err(e.into());
        }
        Ok(())
    })?;

    confirm(config, format!("Store '{}' created", store.display()));
    Ok(())
}

/// Print the decrypted store as indented JSON.
pub fn dump(config: &Config) -> anyhow::Result<()> {
    with_session(config, |session| {
        let doc = session.load()?;
        let pretty = doc.serialize_pretty()?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&pretty)?;
        stdout.write_all(b"\n")?;
        Ok(())
    })
}
