//! # HMAC Envelope Signing and Verification
//!
//! The `Verifier` turns a serializable record into the wire envelope
//! `<base64 canonical JSON>--<lowercase hex HMAC-SHA256>` and back.
//!
//! ## Security Invariant
//!
//! - The HMAC key is `derived key || salt`, where the derived key comes from
//!   the key resolver exactly once (memoized) — by default a
//!   PBKDF2-HMAC-SHA256 derivation over the application secret.
//! - Signature comparison is constant time (`subtle::ConstantTimeEq`).
//! - `Debug` never prints key material.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use globalid_core::CanonicalBytes;

use crate::error::VerifierError;

type HmacSha256 = Hmac<Sha256>;

/// The fixed salt used for key derivation and HMAC keying.
pub const DEFAULT_SALT: &str = "signed_global_ids";

/// PBKDF2 iteration count for the default key derivation.
pub const KEY_ITERATIONS: u32 = 100;

/// Derived key length in bytes.
pub const KEY_SIZE: usize = 64;

type KeyResolver = Box<dyn Fn() -> Vec<u8> + Send + Sync>;

/// HMAC-SHA256 signer with a lazily derived, memoized key.
pub struct Verifier {
    key_resolver: KeyResolver,
    salt: String,
    cached_key: OnceCell<Vec<u8>>,
}

impl Verifier {
    /// Create a verifier with an explicit key resolver.
    ///
    /// The resolver runs at most once; its result is cached for the
    /// verifier's lifetime.
    pub fn new(
        key_resolver: impl Fn() -> Vec<u8> + Send + Sync + 'static,
        salt: impl Into<String>,
    ) -> Self {
        Self {
            key_resolver: Box::new(key_resolver),
            salt: salt.into(),
            cached_key: OnceCell::new(),
        }
    }

    /// Create a verifier whose key is derived from an application secret via
    /// PBKDF2-HMAC-SHA256 with the fixed salt, 100 iterations, and a 64-byte
    /// output.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref().to_vec();
        Self::new(
            move || {
                let mut derived = vec![0u8; KEY_SIZE];
                pbkdf2::pbkdf2_hmac::<Sha256>(
                    &secret,
                    DEFAULT_SALT.as_bytes(),
                    KEY_ITERATIONS,
                    &mut derived,
                );
                derived
            },
            DEFAULT_SALT,
        )
    }

    /// Sign a record into the `<base64 payload>--<hex signature>` envelope.
    ///
    /// Output is deterministic for identical records and identical keys.
    ///
    /// # Errors
    ///
    /// Fails only if the record cannot be canonicalized.
    pub fn generate(&self, data: &impl Serialize) -> Result<String, VerifierError> {
        let canonical = CanonicalBytes::new(data)?;
        let payload = BASE64.encode(canonical.as_bytes());
        let signature = self.signature_for(&payload);
        Ok(format!("{payload}--{signature}"))
    }

    /// Verify an envelope and parse its payload back into a record.
    ///
    /// # Errors
    ///
    /// Every failure mode — wrong part count, signature mismatch, bad base64,
    /// malformed payload — collapses into `InvalidSignature`.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, VerifierError> {
        let parts: Vec<&str> = token.split("--").collect();
        let [payload, signature] = parts.as_slice() else {
            return Err(VerifierError::InvalidSignature);
        };

        let expected = self.signature_for(payload);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(VerifierError::InvalidSignature);
        }

        let decoded = BASE64
            .decode(payload)
            .map_err(|_| VerifierError::InvalidSignature)?;
        serde_json::from_slice(&decoded).map_err(|_| VerifierError::InvalidSignature)
    }

    /// Lowercase hex HMAC-SHA256 over the base64 payload.
    fn signature_for(&self, payload: &str) -> String {
        let key = self.key();
        let mut mac_key = Vec::with_capacity(key.len() + self.salt.len());
        mac_key.extend_from_slice(key);
        mac_key.extend_from_slice(self.salt.as_bytes());

        // HMAC accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(&mac_key)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn key(&self) -> &[u8] {
        self.cached_key.get_or_init(|| (self.key_resolver)())
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Verifier(<key hidden>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Record {
        sgid: String,
        purpose: String,
        expires_at: Option<String>,
    }

    fn record() -> Record {
        Record {
            sgid: "gid://laravel/Person/1".to_string(),
            purpose: "default".to_string(),
            expires_at: None,
        }
    }

    fn verifier() -> Verifier {
        Verifier::new(|| b"MuchSECRETsoHIDDEN".to_vec(), "salty")
    }

    #[test]
    fn test_roundtrip() {
        let v = verifier();
        let token = v.generate(&record()).unwrap();
        let parsed: Record = v.verify(&token).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_envelope_shape() {
        let v = verifier();
        let token = v.generate(&record()).unwrap();
        let parts: Vec<&str> = token.split("--").collect();
        assert_eq!(parts.len(), 2);
        // hex HMAC-SHA256 is 64 chars
        assert_eq!(parts[1].len(), 64);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic() {
        let v = verifier();
        assert_eq!(v.generate(&record()).unwrap(), v.generate(&record()).unwrap());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let v = verifier();
        let token = v.generate(&record()).unwrap();
        let (payload, signature) = token.split_once("--").unwrap();
        let mut flipped: String = payload.to_string();
        let first = flipped.remove(0);
        flipped.insert(0, if first == 'A' { 'B' } else { 'A' });
        let result: Result<Record, _> = v.verify(&format!("{flipped}--{signature}"));
        assert!(matches!(result, Err(VerifierError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let v = verifier();
        let token = v.generate(&record()).unwrap();
        let (payload, signature) = token.split_once("--").unwrap();
        let mut flipped: String = signature.to_string();
        let last = flipped.pop().unwrap();
        flipped.push(if last == '0' { '1' } else { '0' });
        let result: Result<Record, _> = v.verify(&format!("{payload}--{flipped}"));
        assert!(matches!(result, Err(VerifierError::InvalidSignature)));
    }

    #[test]
    fn test_wrong_part_count_fails() {
        let v = verifier();
        assert!(matches!(
            v.verify::<Record>("justonepart"),
            Err(VerifierError::InvalidSignature)
        ));
        assert!(matches!(
            v.verify::<Record>("a--b--c"),
            Err(VerifierError::InvalidSignature)
        ));
        assert!(matches!(
            v.verify::<Record>(""),
            Err(VerifierError::InvalidSignature)
        ));
    }

    #[test]
    fn test_different_keys_reject_each_other() {
        let a = Verifier::new(|| b"key-a".to_vec(), "salty");
        let b = Verifier::new(|| b"key-b".to_vec(), "salty");
        let token = a.generate(&record()).unwrap();
        assert!(b.verify::<Record>(&token).is_err());
    }

    #[test]
    fn test_different_salts_reject_each_other() {
        let a = Verifier::new(|| b"key".to_vec(), "salt-a");
        let b = Verifier::new(|| b"key".to_vec(), "salt-b");
        let token = a.generate(&record()).unwrap();
        assert!(b.verify::<Record>(&token).is_err());
    }

    #[test]
    fn test_key_resolver_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let v = Verifier::new(
            move || {
                counted.fetch_add(1, Ordering::SeqCst);
                b"secret".to_vec()
            },
            "salty",
        );
        let token = v.generate(&record()).unwrap();
        let _: Record = v.verify(&token).unwrap();
        let _ = v.generate(&record()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_secret_is_deterministic() {
        let a = Verifier::from_secret("app-secret");
        let b = Verifier::from_secret("app-secret");
        let token = a.generate(&record()).unwrap();
        let parsed: Record = b.verify(&token).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_payload_is_canonical_json() {
        let v = verifier();
        let token = v.generate(&record()).unwrap();
        let (payload, _) = token.split_once("--").unwrap();
        let decoded = BASE64.decode(payload).unwrap();
        let json = String::from_utf8(decoded).unwrap();
        // JCS output: sorted keys, compact separators.
        assert_eq!(
            json,
            r#"{"expires_at":null,"purpose":"default","sgid":"gid://laravel/Person/1"}"#
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let v = verifier();
        assert_eq!(format!("{v:?}"), "Verifier(<key hidden>)");
    }
}
