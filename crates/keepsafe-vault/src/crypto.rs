//! Encrypt-and-sign / decrypt-and-verify against the ambient OpenPGP
//! keyring.
//!
//! Every store write is armored, encrypted to each configured recipient
//! with always-trust semantics, and signed by each configured signer; every
//! read decrypts and verifies the embedded signatures in one pass. With no
//! configured keys the default secret key in the keyring serves as both
//! recipient and signer.
//!
//! When no key agent is available (or the agent is disabled), a loopback
//! passphrase provider prompts on stderr with echo disabled and zeroes the
//! passphrase as soon as it has been handed to the engine.

use std::env;
use std::io::Write;

use gpgme::{
    Context, EncryptFlags, Key, PassphraseRequest, PinentryMode, Protocol, SignatureSummary,
    VerificationResult,
};
use tracing::debug;
use zeroize::Zeroizing;

use keepsafe_core::Config;

use crate::error::{Result, VaultError};

/// Upper bound on an interactively entered passphrase, in bytes.
const MAX_PASSPHRASE_LEN: usize = 512;

/// An armored, encrypted-and-signed representation of one serialized
/// document. The only form the store file ever holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// OpenPGP backend bound to the invocation's key configuration.
pub struct CryptoBackend {
    fingerprints: Vec<String>,
    interactive_passphrase: bool,
}

impl CryptoBackend {
    /// Create a backend from the invocation configuration.
    ///
    /// The key list was already split at startup; fingerprints are resolved
    /// transiently for each operation. The passphrase callback engages when
    /// no agent is detected or the agent is explicitly disabled.
    pub fn new(config: &Config) -> Self {
        Self {
            fingerprints: config.keys.clone(),
            interactive_passphrase: !config.use_agent || !agent_available(),
        }
    }

    /// Encrypt `plaintext` to every configured recipient and sign it with
    /// every configured signer.
    pub fn encrypt_sign(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        let mut ctx = self.context()?;
        ctx.set_text_mode(true);

        if self.interactive_passphrase {
            ctx.with_passphrase_provider(read_passphrase, |ctx| {
                encrypt_sign_with(ctx, &self.fingerprints, plaintext)
            })
        } else {
            encrypt_sign_with(&mut ctx, &self.fingerprints, plaintext)
        }
    }

    /// Decrypt `ciphertext` and verify its embedded signatures in one pass.
    pub fn decrypt_verify(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        let mut ctx = self.context()?;

        if self.interactive_passphrase {
            ctx.with_passphrase_provider(read_passphrase, |ctx| {
                decrypt_verify_with(ctx, ciphertext.as_bytes())
            })
        } else {
            decrypt_verify_with(&mut ctx, ciphertext.as_bytes())
        }
    }

    fn context(&self) -> Result<Context> {
        let mut ctx = Context::from_protocol(Protocol::OpenPgp)
            .map_err(|e| VaultError::CryptoInit(e.to_string()))?;
        ctx.set_armor(true);

        if self.interactive_passphrase {
            ctx.set_pinentry_mode(PinentryMode::Loopback)
                .map_err(|e| VaultError::CryptoInit(e.to_string()))?;
        }

        Ok(ctx)
    }
}

fn encrypt_sign_with(
    ctx: &mut Context,
    fingerprints: &[String],
    plaintext: &[u8],
) -> Result<Ciphertext> {
    let keys = resolve_keys(ctx, fingerprints)?;
    debug!(recipients = keys.len(), "encrypting store");

    ctx.clear_signers();
    for key in &keys {
        ctx.add_signer(key).map_err(|e| {
            VaultError::CryptoOperation(format!("cannot sign with {}: {e}", key_id(key)))
        })?;
    }

    let mut output = Vec::new();
    let (encrypt_result, sign_result) = ctx
        .sign_and_encrypt_with_flags(&keys, plaintext, &mut output, EncryptFlags::ALWAYS_TRUST)
        .map_err(|e| VaultError::CryptoOperation(format!("encrypt/sign failed: {e}")))?;

    if let Some(invalid) = encrypt_result.invalid_recipients().next() {
        return Err(VaultError::CryptoOperation(format!(
            "recipient rejected by engine: {}",
            invalid.fingerprint().unwrap_or("<unknown>")
        )));
    }
    if let Some(invalid) = sign_result.invalid_signers().next() {
        return Err(VaultError::CryptoOperation(format!(
            "signer rejected by engine: {}",
            invalid.fingerprint().unwrap_or("<unknown>")
        )));
    }

    Ok(Ciphertext(output))
}

fn decrypt_verify_with(ctx: &mut Context, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut plaintext = Vec::new();
    let (decrypt_result, verify_result) = ctx
        .decrypt_and_verify(ciphertext, &mut plaintext)
        .map_err(|e| VaultError::CryptoOperation(format!("decrypt failed: {e}")))?;

    if let Some(algorithm) = decrypt_result.unsupported_algorithm_raw() {
        return Err(VaultError::CryptoOperation(format!(
            "unsupported algorithm: {}",
            algorithm.to_string_lossy()
        )));
    }

    check_signatures(&verify_result)?;
    Ok(plaintext)
}

/// Resolve the configured fingerprints, in order, to key handles.
///
/// With no configured keys, the first secret key in the keyring is the
/// default identity, serving as both recipient and signer.
fn resolve_keys(ctx: &mut Context, fingerprints: &[String]) -> Result<Vec<Key>> {
    if fingerprints.is_empty() {
        let mut iter = ctx
            .secret_keys()
            .map_err(|e| VaultError::CryptoKey(format!("cannot list secret keys: {e}")))?;
        let first = iter.next().and_then(|k| k.ok());
        drop(iter);

        return first.map(|key| vec![key]).ok_or_else(|| {
            VaultError::CryptoKey("no secret key in keyring to use as default identity".to_string())
        });
    }

    fingerprints
        .iter()
        .map(|fpr| {
            ctx.get_key(fpr.as_str())
                .map_err(|e| VaultError::CryptoKey(format!("{fpr}: {e}")))
        })
        .collect()
}

/// Reject anything short of a fully valid signature.
///
/// Untrusted, expired, revoked, and absent signatures are all hard
/// failures, not warnings: an unverified store may have been tampered with.
fn check_signatures(result: &VerificationResult) -> Result<()> {
    let mut seen = 0;
    for signature in result.signatures() {
        seen += 1;
        let summary = signature.summary();
        if !summary.contains(SignatureSummary::VALID) {
            return Err(VaultError::Verification(format!(
                "signature from {} is not fully valid ({summary:?})",
                signature.fingerprint().unwrap_or("<unknown>")
            )));
        }
    }

    if seen == 0 {
        return Err(VaultError::Verification("store carries no signature".to_string()));
    }
    Ok(())
}

/// Loopback passphrase callback.
///
/// Prompts on stderr with echo disabled, reads one bounded line, hands the
/// bytes to the engine's channel, and zeroes the in-memory copy on return.
/// May run several times for multi-key operations; the secret never reaches
/// the log stream.
fn read_passphrase(
    request: PassphraseRequest<'_>,
    out: &mut dyn Write,
) -> std::result::Result<(), gpgme::Error> {
    if request.prev_attempt_failed {
        eprintln!("Previous passphrase was incorrect.");
    }

    let hint = request
        .user_id_hint()
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or("default key")
        .to_string();
    eprint!("Enter passphrase for {hint}: ");
    let _ = std::io::stderr().flush();

    let passphrase =
        Zeroizing::new(rpassword::read_password().map_err(|_| gpgme::Error::CANCELED)?);
    eprintln!();

    if passphrase.len() > MAX_PASSPHRASE_LEN {
        eprintln!("Passphrase exceeds {MAX_PASSPHRASE_LEN} bytes.");
        return Err(gpgme::Error::CANCELED);
    }

    out.write_all(passphrase.as_bytes())
        .map_err(|_| gpgme::Error::CANCELED)?;
    Ok(())
}

fn agent_available() -> bool {
    agent_indicator(env::var("GPG_AGENT_INFO").ok().as_deref())
}

/// The agent indicator is a socket spec of the form `path:pid:version`.
fn agent_indicator(value: Option<&str>) -> bool {
    value.map(|v| v.contains(':')).unwrap_or(false)
}

fn key_id(key: &Key) -> String {
    key.id().unwrap_or("<unknown>").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_indicator() {
        assert!(!agent_indicator(None));
        assert!(!agent_indicator(Some("")));
        assert!(!agent_indicator(Some("garbage")));
        assert!(agent_indicator(Some("/run/gpg-agent:1234:1")));
    }

    #[test]
    fn test_backend_honors_no_agent() {
        let config = Config {
            use_agent: false,
            ..Config::default()
        };
        let backend = CryptoBackend::new(&config);
        assert!(backend.interactive_passphrase);
    }

    #[test]
    fn test_backend_copies_key_order() {
        let config = Config {
            keys: vec!["BBBB".to_string(), "AAAA".to_string()],
            ..Config::default()
        };
        let backend = CryptoBackend::new(&config);
        assert_eq!(backend.fingerprints, vec!["BBBB", "AAAA"]);
    }

    #[test]
    fn test_ciphertext_accessors() {
        let ct = Ciphertext::from_bytes(b"-----BEGIN PGP MESSAGE-----".to_vec());
        assert_eq!(ct.as_bytes(), b"-----BEGIN PGP MESSAGE-----");
        assert_eq!(ct.clone().into_bytes(), ct.as_bytes());
    }

    // Requires a provisioned keyring, so it does not run by default:
    //   gpg --batch --passphrase '' --quick-gen-key keepsafe-test default default
    #[test]
    #[ignore = "requires a default secret key in the local GnuPG keyring"]
    fn test_round_trip_with_keyring() {
        let backend = CryptoBackend::new(&Config::default());
        let plaintext = br#"{"accounts":{}}"#;

        let ciphertext = backend.encrypt_sign(plaintext).unwrap();
        assert!(ciphertext.as_bytes().starts_with(b"-----BEGIN PGP MESSAGE-----"));

        let decrypted = backend.decrypt_verify(&ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }
}
