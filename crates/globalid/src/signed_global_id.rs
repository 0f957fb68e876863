//! # Signed Global Identifier
//!
//! Embeds a global identifier in a tamper-evident envelope tagged with a
//! purpose and an optional expiration, suitable for untrusted channels
//! (URLs, emails, tokens).
//!
//! ## Lifecycle
//!
//! An instance starts unsigned; the envelope token is computed on the first
//! [`SignedGlobalId::to_token`] call and cached for the instance's lifetime.
//! Signing is idempotent and the cached value never changes.
//!
//! ## Soft-failure parsing
//!
//! [`SignedGlobalId::parse`] returns `None` for a bad signature, an expired
//! envelope, or a purpose mismatch — indistinguishably. Purpose and expiry
//! are advisory token validity, not access control, and a caller must not be
//! able to learn which check rejected an adversarial token.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use globalid_core::{Gid, Locatable, Timestamp};
use globalid_crypto::{Verifier, VerifierError};

use crate::context::GlobalIdContext;
use crate::error::GlobalIdError;
use crate::global_id::GlobalId;

/// The purpose applied when none is requested.
pub const DEFAULT_PURPOSE: &str = "default";

/// Expiration requested at creation time.
///
/// `Default` defers to the context's expiration resolver; `Never` is the
/// explicit "no expiration" value, distinct from leaving the choice to the
/// resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expiration {
    /// Use the context's default expiration policy.
    #[default]
    Default,
    /// Explicitly never expire.
    Never,
    /// Expire at the given instant.
    At(Timestamp),
}

/// Options for [`SignedGlobalId::create`].
#[derive(Debug, Default, Clone)]
pub struct SignedCreateOptions {
    /// Overrides the context's default app name.
    pub app: Option<String>,
    /// The purpose scoping this identifier (`for` on the wire).
    pub purpose: Option<String>,
    /// The requested expiration.
    pub expires_at: Expiration,
    /// Query params carried by the inner identifier.
    pub params: IndexMap<String, String>,
}

/// Options for [`SignedGlobalId::parse`].
#[derive(Debug, Default, Clone)]
pub struct SignedParseOptions {
    /// The purpose the envelope must have been minted for.
    pub purpose: Option<String>,
}

/// The signed envelope record.
///
/// `expires_at` is an ISO-8601 UTC string with `Z` suffix, or `null` for no
/// expiration.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    sgid: String,
    purpose: String,
    expires_at: Option<String>,
}

/// A global identifier wrapped in a signed, purpose- and expiry-tagged
/// envelope.
#[derive(Clone)]
pub struct SignedGlobalId {
    gid: Gid,
    verifier: Arc<Verifier>,
    purpose: String,
    expires_at: Option<Timestamp>,
    cached_token: OnceCell<String>,
}

impl SignedGlobalId {
    /// Create a signed identifier for an entity.
    ///
    /// # Errors
    ///
    /// Fails with `MissingApp` under the same condition as
    /// [`GlobalId::create`].
    pub fn create(
        model: &dyn Locatable,
        ctx: &GlobalIdContext,
        options: SignedCreateOptions,
    ) -> Result<Self, GlobalIdError> {
        let app = options
            .app
            .or_else(|| ctx.app().map(str::to_owned))
            .ok_or(GlobalIdError::MissingApp)?;
        let gid = Gid::create(app, model, options.params);
        Ok(Self {
            gid,
            verifier: ctx.verifier().clone(),
            purpose: options
                .purpose
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string()),
            expires_at: match options.expires_at {
                Expiration::Default => ctx.default_expiration(),
                Expiration::Never => None,
                Expiration::At(at) => Some(at),
            },
            cached_token: OnceCell::new(),
        })
    }

    /// Verify and parse a signed envelope.
    ///
    /// Returns `None` on any signature, structure, expiry, or purpose
    /// failure.
    pub fn parse(value: &str, ctx: &GlobalIdContext, options: &SignedParseOptions) -> Option<Self> {
        Self::parse_at(value, ctx, options, Timestamp::now())
    }

    pub(crate) fn parse_at(
        value: &str,
        ctx: &GlobalIdContext,
        options: &SignedParseOptions,
        now: Timestamp,
    ) -> Option<Self> {
        let envelope: Envelope = match ctx.verifier().verify(value) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::debug!(%error, "rejected signed global id");
                return None;
            }
        };

        let expires_at = match &envelope.expires_at {
            Some(raw) => Some(Timestamp::parse_lenient(raw).ok()?),
            None => None,
        };
        if let Some(at) = expires_at {
            if at < now {
                tracing::debug!("rejected expired signed global id");
                return None;
            }
        }

        let wanted = options.purpose.as_deref().unwrap_or(DEFAULT_PURPOSE);
        if envelope.purpose != wanted {
            tracing::debug!("rejected signed global id minted for another purpose");
            return None;
        }

        let gid = Gid::parse(Some(&envelope.sgid)).ok()?;
        Some(Self {
            gid,
            verifier: ctx.verifier().clone(),
            purpose: envelope.purpose,
            expires_at,
            cached_token: OnceCell::new(),
        })
    }

    /// The signed envelope token, computed once and cached.
    ///
    /// # Errors
    ///
    /// Fails only if the envelope record cannot be canonicalized.
    pub fn to_token(&self) -> Result<String, VerifierError> {
        self.cached_token
            .get_or_try_init(|| self.verifier.generate(&self.envelope()))
            .cloned()
    }

    /// The transport form of a signed identifier is the token itself.
    pub fn to_param(&self) -> Result<String, VerifierError> {
        self.to_token()
    }

    /// The purpose this identifier was minted for.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// When this identifier stops verifying, if ever.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// The app (authority) segment.
    pub fn app(&self) -> &str {
        self.gid.app()
    }

    /// The stored model type tag.
    pub fn model_name(&self) -> &str {
        self.gid.model_name()
    }

    /// The model's primary key.
    pub fn model_id(&self) -> &str {
        self.gid.model_id()
    }

    /// The underlying URI value.
    pub fn gid(&self) -> &Gid {
        &self.gid
    }

    /// The inner identifier without the envelope.
    pub fn to_global_id(&self) -> GlobalId {
        GlobalId::from(self.gid.clone())
    }

    fn envelope(&self) -> Envelope {
        Envelope {
            sgid: self.gid.to_string(),
            purpose: self.purpose.clone(),
            expires_at: self.expires_at.map(|at| at.to_iso8601()),
        }
    }
}

impl std::fmt::Debug for SignedGlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedGlobalId")
            .field("gid", &self.gid)
            .field("purpose", &self.purpose)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SignedGlobalId {
    /// Signed identifiers are equal when both the inner identifier and the
    /// purpose match.
    fn eq(&self, other: &Self) -> bool {
        self.gid == other.gid && self.purpose == other.purpose
    }
}

impl Eq for SignedGlobalId {}

impl PartialEq<GlobalId> for SignedGlobalId {
    /// Against a plain identifier only the inner identifier counts.
    fn eq(&self, other: &GlobalId) -> bool {
        &self.gid == other.gid()
    }
}
