//! # Error Types — Creation and Resolution Failures
//!
//! ## Design
//!
//! Creation-time and registration-time misuse are hard failures (caller
//! bugs). Parse-time problems never surface here — they are soft `None`
//! results, because the input is untrusted by design. Batch resolution is
//! the one place where a missing referent is a hard failure by default:
//! silent partial results are more dangerous than a failure signal, and
//! `ignore_missing` opts out explicitly.

use thiserror::Error;

use globalid_core::GidParseError;

/// Errors raised while creating a global identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlobalIdError {
    /// Neither the options nor the context carried an app name.
    #[error("an app is required to create a GlobalId")]
    MissingApp,

    /// The app name failed validation.
    #[error(transparent)]
    Parse(#[from] GidParseError),
}

/// Errors raised by the locator protocol.
#[derive(Error, Debug)]
pub enum LocatorError {
    /// A locator was registered under an invalid app name.
    #[error("invalid app name for locator registration: {0}")]
    InvalidApp(#[source] GidParseError),

    /// A batch entry could not be found and `ignore_missing` was not set.
    #[error("one or more entries passed to locate_many could not be found")]
    BatchEntryMissing,

    /// The repository collaborator failed; propagated, never retried.
    #[error("repository lookup failed: {0}")]
    Repository(String),
}
