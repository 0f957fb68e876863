//! # globalid-core — Foundational Types for the Global ID Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the `gid://` URI
//! codec and the primitives every other crate builds on: canonical byte
//! production for signing payloads, UTC-only timestamps for expiration
//! handling, and the identification capability an entity type implements to
//! participate in global identification.
//!
//! ## Key Design Principles
//!
//! 1. **One validation path.** App names are accepted in exactly one place:
//!    the URI parser. Context configuration and locator registration both
//!    round-trip through [`Gid::validate_app_name`] instead of re-implementing
//!    the charset rule.
//!
//! 2. **`CanonicalBytes` newtype.** All HMAC input flows through
//!    [`CanonicalBytes::new()`] — RFC 8785 canonical JSON with a private inner
//!    field, so non-canonical bytes cannot reach the signer by construction.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] enforces UTC with Z suffix and
//!    seconds precision, matching the envelope wire format.
//!
//! 4. **Explicit capabilities, no reflection.** An entity exposes its stored
//!    type tag and primary key through the [`Locatable`] trait; nothing here
//!    inspects concrete types.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `globalid-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod model;
pub mod temporal;
pub mod uri;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, GidParseError, TimestampError};
pub use model::Locatable;
pub use temporal::Timestamp;
pub use uri::{Gid, ParamValue, SCHEME};
