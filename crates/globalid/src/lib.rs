//! # globalid — Global Identifiers, Signed Variants, and Resolution
//!
//! This crate assembles the stack: [`GlobalId`] wraps a `gid://` URI with
//! creation and dual-path parsing, [`SignedGlobalId`] embeds one in a
//! tamper-evident envelope scoped by purpose and expiration, and the
//! [`Locator`] dispatches parsed identifiers to per-app resolution
//! strategies.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit context, no process globals.** The default app name, the
//!    verifier, and the expiration policy live in a [`GlobalIdContext`]
//!    value threaded through creation and parsing. Tests build isolated
//!    contexts instead of mutating shared state.
//!
//! 2. **Hard failures for caller bugs, soft failures for untrusted input.**
//!    Creating an identifier without an app or registering a locator under a
//!    bad app name returns an error. Parsing an externally supplied string —
//!    canonical, compact-encoded, or signed — returns `None` on any problem,
//!    and a signed parse never reveals whether the signature, the expiry, or
//!    the purpose was at fault.
//!
//! 3. **Capabilities at the seams.** Persistence is reached only through
//!    [`ModelFinder`], and the `only` type filter consults a
//!    [`ModelHierarchy`] so the host application's alias registry stays
//!    external.

pub mod context;
pub mod error;
pub mod global_id;
pub mod locator;
pub mod model;
pub mod signed_global_id;

// Re-export primary types for ergonomic imports.
pub use context::{ExpirationResolver, GlobalIdContext};
pub use error::{GlobalIdError, LocatorError};
pub use global_id::{CreateOptions, GlobalId};
pub use locator::{
    BaseLocator, LocateManyOptions, LocateOptions, Locator, LocatorContract,
    SignedLocateManyOptions, SignedLocateOptions,
};
pub use model::{ExactMatch, HasGlobalIdentification, ModelFinder, ModelHierarchy};
pub use signed_global_id::{
    Expiration, SignedCreateOptions, SignedGlobalId, SignedParseOptions, DEFAULT_PURPOSE,
};

// The foundational types are part of this crate's public API.
pub use globalid_core::{Gid, GidParseError, Locatable, ParamValue, Timestamp};
pub use globalid_crypto::Verifier;
