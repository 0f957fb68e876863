//! # Error Types — Signing Failures

use thiserror::Error;

use globalid_core::CanonicalizationError;

/// Errors raised by the [`crate::Verifier`].
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Malformed envelope, bad payload, or signature mismatch.
    ///
    /// Deliberately carries no detail: callers must not be able to tell
    /// which check failed on untrusted input.
    #[error("invalid signature")]
    InvalidSignature,

    /// The record could not be canonicalized for signing.
    #[error("could not canonicalize signing payload: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
