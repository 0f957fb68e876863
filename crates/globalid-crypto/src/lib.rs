//! # globalid-crypto — Keyed Signing for the Global ID Stack
//!
//! Provides the [`Verifier`], the HMAC-SHA256 signer that wraps identifier
//! records in the tamper-evident `<base64 payload>--<hex signature>` envelope
//! used by signed global IDs.
//!
//! ## Key Design Principles
//!
//! 1. **Signing input is `CanonicalBytes` only.** The payload is produced by
//!    the canonicalization pipeline in `globalid-core`, never from raw bytes.
//!
//! 2. **One derived key per verifier.** Key derivation (PBKDF2-HMAC-SHA256)
//!    runs at most once and is memoized for the verifier's lifetime.
//!
//! 3. **Constant-time comparison.** Signature checks go through `subtle`;
//!    every verification failure collapses into a single `InvalidSignature`
//!    error that reveals nothing about which check failed.

pub mod error;
pub mod verifier;

pub use error::VerifierError;
pub use verifier::{Verifier, DEFAULT_SALT, KEY_ITERATIONS, KEY_SIZE};
