//! keepsafe command-line interface.

pub mod commands;
pub mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keepsafe_core::{config, Config};

/// keepsafe - encrypted credential store
#[derive(Parser)]
#[command(name = "keepsafe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this store file instead of the default
    #[arg(short = 'D', long = "store", env = "KEEPSAFE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Space-separated recipient/signer key fingerprints
    #[arg(short = 'K', long = "keys", env = "KEEPSAFE_KEYS", global = true)]
    pub keys: Option<String>,

    /// Suppress success confirmations
    #[arg(short = 'Q', long, env = "KEEPSAFE_QUIET", global = true)]
    pub quiet: bool,

    /// Do not snapshot the store before mutating it
    #[arg(short = 'B', long, env = "KEEPSAFE_NO_BACKUP", global = true)]
    pub no_backup: bool,

    /// Demote failed preflight security checks to warnings
    #[arg(long, env = "KEEPSAFE_NO_SECURE", global = true)]
    pub no_secure: bool,

    /// Prompt for passphrases even when a key agent is running
    #[arg(long, env = "KEEPSAFE_NO_AGENT", global = true)]
    pub no_agent: bool,

    /// Mask secrets when printing them to the terminal
    #[arg(long, env = "KEEPSAFE_HIDE", global = true)]
    pub hide: bool,

    /// Treat lookup ids as patterns instead of exact names
    #[arg(short = 'F', long, env = "KEEPSAFE_FUZZY", global = true)]
    pub fuzzy: bool,

    /// Always print a trailing newline after bare values
    #[arg(short = 'N', long, env = "KEEPSAFE_PRINT_NEWLINE", global = true)]
    pub print_newline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Create a new, empty store
    Create,

    /// Add an account (prompts for user name and secret)
    Add {
        /// Account id
        id: String,
    },

    /// Print the user name of an account
    User {
        /// Account id (a pattern with --fuzzy)
        id: String,
    },

    /// Print the secret of an account
    Passwd {
        /// Account id (a pattern with --fuzzy)
        id: String,
    },

    /// Modify an account (blank input keeps the current value)
    Edit {
        /// Account id
        id: String,
    },

    /// Remove an account
    Remove {
        /// Account id
        id: String,
    },

    /// List account ids matching a pattern
    Search {
        /// Extended regular expression matched against account ids
        pattern: String,
    },

    /// Print the decrypted store as indented JSON
    Dump,

    /// Estimate how long a secret would survive a cracking attempt
    Check {
        /// Secret to check (if omitted, prompts for hidden input)
        secret: Option<String>,
    },

    /// Run the preflight hardening checks and report each result
    RunSecurityTests,
}

impl Cli {
    /// Build the immutable per-invocation configuration.
    pub fn to_config(&self) -> Config {
        Config {
            store_path: self.store.clone(),
            keys: config::parse_key_spec(self.keys.as_deref().unwrap_or("")),
            quiet: self.quiet,
            backup: !self.no_backup,
            strict_checks: !self.no_secure,
            use_agent: !self.no_agent,
            hide: self.hide,
            fuzzy: self.fuzzy,
            print_newline: self.print_newline,
        }
    }
}

/// Run the CLI with the given arguments.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config();
    tracing::debug!(
        keys = config.keys.len(),
        backup = config.backup,
        strict = config.strict_checks,
        "configuration resolved"
    );

    // The reporting command prints the battery instead of enforcing it;
    // everything else passes the gate before any secret is handled.
    if let Command::RunSecurityTests = cli.command {
        return commands::security::run();
    }

    keepsafe_vault::security::enforce(&config)?;

    match cli.command {
        Command::Create => commands::store::create(&config),
        Command::Add { id } => commands::account::add(&config, &id),
        Command::User { id } => commands::account::user(&config, &id),
        Command::Passwd { id } => commands::account::passwd(&config, &id),
        Command::Edit { id } => commands::account::edit(&config, &id),
        Command::Remove { id } => commands::account::remove(&config, &id),
        Command::Search { pattern } => commands::account::search(&config, &pattern),
        Command::Dump => commands::store::dump(&config),
        Command::Check { secret } => commands::check::run(secret.as_deref()),
        Command::RunSecurityTests => unreachable!("handled above"),
    }
}
