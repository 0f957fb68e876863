//! # Canonical Serialization — Signing Payload Bytes
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes fed to the
//! HMAC signer.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which serializes the value
//! as RFC 8785 (JSON Canonicalization Scheme) output: sorted keys, compact
//! separators, deterministic byte sequence.
//!
//! Two logically equal envelope records therefore always produce the same
//! signature input, and a signer cannot be handed bytes that skipped
//! canonicalization.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted lexicographically with compact separators.
/// - The byte sequence is valid UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for signing.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys_compact_separators() {
        let data = serde_json::json!({"purpose": "default", "expires_at": null, "sgid": "gid://app/Person/1"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(
            s,
            r#"{"expires_at":null,"purpose":"default","sgid":"gid://app/Person/1"}"#
        );
    }

    #[test]
    fn test_field_order_is_irrelevant() {
        let a = serde_json::json!({"b": 2, "a": 1});
        let b = serde_json::json!({"a": 1, "b": 2});
        assert_eq!(
            CanonicalBytes::new(&a).unwrap(),
            CanonicalBytes::new(&b).unwrap()
        );
    }

    #[test]
    fn test_struct_fields_sorted_regardless_of_declaration_order() {
        #[derive(serde::Serialize)]
        struct Envelope {
            sgid: String,
            purpose: String,
            expires_at: Option<String>,
        }
        let env = Envelope {
            sgid: "gid://app/Person/1".into(),
            purpose: "default".into(),
            expires_at: None,
        };
        let cb = CanonicalBytes::new(&env).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.starts_with(r#"{"expires_at":null"#));
    }

    #[test]
    fn test_null_passthrough() {
        let data = serde_json::json!({"key": null});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"key":null}"#);
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "\u{00e9}\u{00e8}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
    }

    #[test]
    fn test_len_and_is_empty() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert!(!cb.is_empty());
        assert!(cb.len() > 0);
    }
}
