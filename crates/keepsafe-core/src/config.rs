//! Per-invocation configuration.
//!
//! One immutable [`Config`] value is constructed at startup from the command
//! line and environment, then passed explicitly into every component. No
//! component reads configuration from the environment on its own.

use std::path::PathBuf;

/// Immutable configuration for a single keepsafe invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit store path override; `None` selects the default under the
    /// user's home directory.
    pub store_path: Option<PathBuf>,

    /// Recipient/signer key fingerprints, already split from the
    /// whitespace-separated specification. Empty means "use the default
    /// identity from the ambient keyring".
    pub keys: Vec<String>,

    /// Suppress success confirmations.
    pub quiet: bool,

    /// Snapshot the store file before each mutating command.
    pub backup: bool,

    /// Treat failed preflight security checks as fatal.
    pub strict_checks: bool,

    /// Let a running key agent handle passphrases; when false the
    /// interactive passphrase callback is always used.
    pub use_agent: bool,

    /// Mask secrets when printing them to the terminal.
    pub hide: bool,

    /// Use pattern matching instead of exact-id lookup for read commands.
    pub fuzzy: bool,

    /// Always print a trailing newline after a bare value, even when stdout
    /// is not a terminal.
    pub print_newline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            keys: Vec::new(),
            quiet: false,
            backup: true,
            strict_checks: true,
            use_agent: true,
            hide: false,
            fuzzy: false,
            print_newline: false,
        }
    }
}

/// Split a whitespace-separated key specification into fingerprints.
///
/// The empty specification yields an empty list; surrounding and repeated
/// whitespace is ignored.
pub fn parse_key_spec(spec: &str) -> Vec<String> {
    spec.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.store_path.is_none());
        assert!(config.keys.is_empty());
        assert!(config.backup);
        assert!(config.strict_checks);
        assert!(config.use_agent);
        assert!(!config.fuzzy);
    }

    #[test]
    fn test_parse_key_spec_empty() {
        assert!(parse_key_spec("").is_empty());
        assert!(parse_key_spec("   ").is_empty());
    }

    #[test]
    fn test_parse_key_spec_single() {
        assert_eq!(
            parse_key_spec("A4F455C3414B1056"),
            vec!["A4F455C3414B1056".to_string()]
        );
    }

    #[test]
    fn test_parse_key_spec_multiple_preserves_order() {
        let keys = parse_key_spec("  AAAA  BBBB\tCCCC ");
        assert_eq!(keys, vec!["AAAA", "BBBB", "CCCC"]);
    }
}
