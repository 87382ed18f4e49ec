//! Account commands: add, user, passwd, edit, remove, search.

use std::io::Write;

use keepsafe_core::Config;
use keepsafe_vault::{AccountRecord, VaultError};

use super::{confirm, with_session};
use crate::commands::check;
use crate::prompt;

/// Add a new account, prompting for its user name and secret.
pub fn add(config: &Config, id: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        session.backup()?;
        let mut doc = session.load()?;

        if doc.get(id).is_some() {
            return Err(VaultError::Exists(format!("account '{id}'")).into());
        }

        let user = prompt::read_line(&format!("Enter user name for '{id}': "))?;
        let secret = prompt::read_secret(&format!("Enter secret for '{id}': "))?;
        if let Some(estimate) = check::strength_line(&secret) {
            eprintln!("{estimate}");
        }

        doc.set(id, AccountRecord::new(user, secret.as_str()));
        session.sync(&doc)?;
        Ok(())
    })?;

    confirm(config, format!("Account '{id}' added"));
    Ok(())
}

/// Print the user name of an account.
pub fn user(config: &Config, id: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        let doc = session.load()?;
        let record = doc
            .lookup(id, config.fuzzy)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        print_value(config, &record.user);
        Ok(())
    })
}

/// Print the secret of an account.
pub fn passwd(config: &Config, id: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        let doc = session.load()?;
        let record = doc
            .lookup(id, config.fuzzy)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        let secret = record.secret.expose_secret();
        if config.hide {
            print_value(config, &"*".repeat(secret.chars().count()));
        } else {
            print_value(config, secret);
        }
        Ok(())
    })
}

/// Modify an account; blank input keeps the current value.
pub fn edit(config: &Config, id: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        session.backup()?;
        let mut doc = session.load()?;

        let current = doc
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        let new_id = prompt::read_line(&format!("Enter new account id [{id}]: "))?;
        let new_id = if new_id.is_empty() { id.to_string() } else { new_id };

        let user = prompt::read_line(&format!(
            "Enter new user name for '{id}' [{}]: ",
            current.user
        ))?;
        let user = if user.is_empty() { current.user.clone() } else { user };

        let secret =
            prompt::read_secret(&format!("Enter new secret for '{id}' (blank keeps current): "))?;
        let secret = if secret.is_empty() {
            current.secret.clone()
        } else {
            secret.as_str().into()
        };

        doc.set(new_id.clone(), AccountRecord::new(user, secret));
        if new_id != id {
            doc.delete(id)?;
        }

        session.sync(&doc)?;
        Ok(())
    })?;

    confirm(config, format!("Account '{id}' edited"));
    Ok(())
}

/// Remove an account.
pub fn remove(config: &Config, id: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        session.backup()?;
        let mut doc = session.load()?;

        doc.delete(id)?;
        session.sync(&doc)?;
        Ok(())
    })?;

    confirm(config, format!("Account '{id}' removed"));
    Ok(())
}

/// List the ids of every account matching the pattern.
pub fn search(config: &Config, pattern: &str) -> anyhow::Result<()> {
    with_session(config, |session| {
        let doc = session.load()?;
        for id in doc.find(pattern)?.keys() {
            println!("{id}");
        }
        Ok(())
    })
}

/// Print a bare value for shell capture.
///
/// The trailing newline is added only for a human at a terminal (or on
/// request), so `$(keepsafe passwd x)` captures the exact secret.
fn print_value(config: &Config, value: &str) {
    print!("{value}");
    if config.print_newline || console::Term::stdout().is_term() {
        println!();
    }
    let _ = std::io::stdout().flush();
}
