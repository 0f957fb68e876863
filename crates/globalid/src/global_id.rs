//! # Global Identifier
//!
//! Wraps a [`Gid`] with creation from an entity, dual-path parsing, the
//! compact transport encoding, and delegation to a [`Locator`].
//!
//! ## Dual-path parsing
//!
//! `GlobalId::parse` first attempts the canonical `gid://` URI form, then
//! falls back to the compact transport encoding (unpadded base64 of the
//! URI). Callers can therefore accept either form interchangeably. Both
//! failures collapse into `None`: an externally supplied identifier string
//! must never crash its consumer.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexMap;

use globalid_core::{Gid, Locatable};

use crate::context::GlobalIdContext;
use crate::error::{GlobalIdError, LocatorError};
use crate::locator::{LocateOptions, Locator};

/// Options for [`GlobalId::create`].
///
/// Rails' GlobalID reserves `app`, `verifier`, and `for` as creation option
/// keys; here they are separate typed fields, so only `params` entries ever
/// reach the query string.
#[derive(Debug, Default, Clone)]
pub struct CreateOptions {
    /// Overrides the context's default app name.
    pub app: Option<String>,
    /// Query params carried by the identifier.
    pub params: IndexMap<String, String>,
}

/// A parsed or constructed global identifier.
#[derive(Debug, Clone)]
pub struct GlobalId {
    gid: Gid,
}

impl GlobalId {
    /// Create an identifier for an entity.
    ///
    /// # Errors
    ///
    /// Fails with `MissingApp` when neither the options nor the context
    /// carry an app name.
    pub fn create(
        model: &dyn Locatable,
        ctx: &GlobalIdContext,
        options: CreateOptions,
    ) -> Result<Self, GlobalIdError> {
        let app = options
            .app
            .or_else(|| ctx.app().map(str::to_owned))
            .ok_or(GlobalIdError::MissingApp)?;
        Ok(Self {
            gid: Gid::create(app, model, options.params),
        })
    }

    /// Parse a canonical `gid://` URI or its compact transport encoding.
    ///
    /// Returns `None` when neither form parses — a soft failure by design.
    pub fn parse(value: &str) -> Option<Self> {
        match Gid::parse(Some(value)) {
            Ok(gid) => Some(Self { gid }),
            Err(_) => Self::parse_encoded(value),
        }
    }

    fn parse_encoded(value: &str) -> Option<Self> {
        let decoded = BASE64.decode(repad(value)).ok()?;
        let uri = String::from_utf8(decoded).ok()?;
        match Gid::parse(Some(&uri)) {
            Ok(gid) => Some(Self { gid }),
            Err(error) => {
                tracing::debug!(%error, "compact transport decoding did not yield a gid URI");
                None
            }
        }
    }

    /// Parse then resolve in one step.
    ///
    /// Returns `Ok(None)` when parsing fails or the entity no longer exists.
    pub fn find(
        value: &str,
        locator: &Locator,
        options: &LocateOptions,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        match Self::parse(value) {
            Some(global_id) => locator.locate(&global_id, options),
            None => Ok(None),
        }
    }

    /// Resolve this identifier through a locator.
    pub fn locate(
        &self,
        locator: &Locator,
        options: &LocateOptions,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        locator.locate(self, options)
    }

    /// The compact transport encoding: unpadded base64 of the canonical URI.
    ///
    /// Trailing `=` characters are stripped because base64 padding is not
    /// safe in all URL contexts; [`GlobalId::parse`] re-derives the padding.
    pub fn to_param(&self) -> String {
        let encoded = BASE64.encode(self.to_string());
        encoded.trim_end_matches('=').to_string()
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

    /// A single query param, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.gid.param(key)
    }

    /// The underlying URI value.
    pub fn gid(&self) -> &Gid {
        &self.gid
    }
}

impl From<Gid> for GlobalId {
    fn from(gid: Gid) -> Self {
        Self { gid }
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.gid.fmt(f)
    }
}

impl PartialEq for GlobalId {
    fn eq(&self, other: &Self) -> bool {
        self.gid == other.gid
    }
}

impl Eq for GlobalId {}

impl PartialEq<crate::signed_global_id::SignedGlobalId> for GlobalId {
    fn eq(&self, other: &crate::signed_global_id::SignedGlobalId) -> bool {
        &self.gid == other.gid()
    }
}

/// Re-derive the base64 padding stripped by [`GlobalId::to_param`].
fn repad(value: &str) -> String {
    let padding = (4 - value.len() % 4) % 4;
    let mut repadded = String::with_capacity(value.len() + padding);
    repadded.push_str(value);
    for _ in 0..padding {
        repadded.push('=');
    }
    repadded
}
