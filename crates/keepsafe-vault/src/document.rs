//! The in-memory account document and its mutation operations.
//!
//! A [`Document`] is the decrypted form of the whole store: a mapping from
//! account id to [`AccountRecord`]. It exists only in memory between a
//! session's `load` and `unload`; persistence is always a full re-encryption
//! of the serialized document, never an incremental write.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use keepsafe_core::SecretString;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// One stored credential entry.
///
/// Records are created and overwritten wholesale; an edit re-supplies every
/// field (the command layer substitutes prior values for blank input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// User name for the account.
    pub user: String,

    /// The account secret. Zeroed on drop, redacted in Debug output.
    #[serde(rename = "pass")]
    pub secret: SecretString,

    /// Last modification time, stored as `YYYY-MM-DD HH:MM:SS` (UTC).
    #[serde(rename = "date", with = "timestamp")]
    pub modified_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Create a record stamped with the current time.
    pub fn new(user: impl Into<String>, secret: impl Into<SecretString>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
            modified_at: Utc::now().trunc_subsecs(0),
        }
    }
}

/// The decrypted in-memory credential store.
///
/// Account ids map to records; the map is ordered so serialized output is
/// deterministic and dumps diff cleanly.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    accounts: BTreeMap<String, AccountRecord>,
}

impl Document {
    /// Create an empty document (the result of `create`).
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Deserialize a document from decrypted store plaintext.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to the compact form handed to the crypto backend.
    ///
    /// Key ordering is stable and there is no extraneous whitespace, so the
    /// same document always produces the same plaintext.
    pub fn serialize_compact(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize to the indented, sorted form used for `dump`.
    ///
    /// Human-facing only; never re-parsed as the store format.
    pub fn serialize_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Look up a record by exact id.
    pub fn get(&self, id: &str) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    /// Insert or overwrite the record for `id` (last write wins).
    pub fn set(&mut self, id: impl Into<String>, record: AccountRecord) {
        self.accounts.insert(id.into(), record);
    }

    /// Remove the record for `id`.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    /// Return every record whose id matches `pattern`.
    ///
    /// The pattern is an unanchored extended regular expression matched
    /// against the id, not the whole record.
    pub fn find(&self, pattern: &str) -> Result<BTreeMap<String, AccountRecord>> {
        let re = Regex::new(pattern)?;
        Ok(self
            .accounts
            .iter()
            .filter(|(id, _)| re.is_match(id))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect())
    }

    /// Return the first record (in id order) whose id matches `pattern`.
    ///
    /// Backs fuzzy lookup, where the queried id is itself treated as a
    /// pattern instead of an exact key.
    pub fn find_first(&self, pattern: &str) -> Result<Option<&AccountRecord>> {
        let re = Regex::new(pattern)?;
        Ok(self
            .accounts
            .iter()
            .find(|(id, _)| re.is_match(id))
            .map(|(_, record)| record))
    }

    /// Look up a record by exact id, or by pattern when `fuzzy` is set.
    pub fn lookup(&self, query: &str, fuzzy: bool) -> Result<Option<&AccountRecord>> {
        if fuzzy {
            self.find_first(query)
        } else {
            Ok(self.get(query))
        }
    }

    /// Iterate over all accounts in id order.
    pub fn accounts(&self) -> impl Iterator<Item = (&str, &AccountRecord)> {
        self.accounts.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the document holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Serde adapter for the store's `YYYY-MM-DD HH:MM:SS` timestamp format.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
