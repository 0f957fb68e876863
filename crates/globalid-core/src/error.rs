//! # Error Types — Codec-Boundary Failures
//!
//! Defines the error types raised by this crate. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Parse errors are hard failures here at the codec boundary. Callers higher
//! in the stack convert them to soft "no value" results when the input is
//! externally supplied; only identifier creation and app-name validation let
//! them propagate.

use thiserror::Error;

/// Errors raised while parsing a `gid://` URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GidParseError {
    /// The input was absent.
    #[error("gid URI cannot be null")]
    NullGid,

    /// The input did not parse as a URI, or its scheme was not `gid`.
    #[error("not a valid gid URI: {0}")]
    BadUri(String),

    /// The host segment was missing or violated the app-name charset
    /// (letters, digits, and hyphens only).
    #[error("invalid app name {0:?}: must be alphanumeric with optional hyphens")]
    InvalidApp(String),

    /// The path carried no model name segment.
    #[error("gid URI is missing the model name segment")]
    MissingPath,

    /// The path carried no model id segment after the model name.
    #[error("gid URI is missing the model id segment")]
    MissingModelId,

    /// The path carried extra segments after the model id.
    #[error("gid URI has extra path segments after the model id")]
    TooManyPathSegments,
}

/// Error during canonical serialization of a signing payload.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JCS serialization failed.
    #[error("canonical serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors raised while constructing a [`crate::Timestamp`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The strict parser only accepts the `Z` suffix.
    #[error("timestamp must use the Z suffix (UTC only), got {0:?}")]
    NonUtc(String),

    /// The input was not valid RFC 3339.
    #[error("invalid RFC 3339 timestamp {value:?}: {reason}")]
    Invalid {
        /// The rejected input.
        value: String,
        /// The parser's rejection reason.
        reason: String,
    },
}
