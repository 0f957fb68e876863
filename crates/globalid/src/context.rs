//! # Context — Explicit Configuration for Identifier Creation
//!
//! Rails' GlobalID keeps the default app name, the configured verifier, and
//! the expiration policy in process-wide mutable state. Here they form an
//! explicit value threaded through creation and parsing calls,
//! so concurrent tests and multi-tenant hosts can hold isolated contexts.

use std::sync::Arc;

use globalid_core::{Gid, Timestamp};
use globalid_crypto::Verifier;

use crate::error::GlobalIdError;

/// Computes the default expiration for a signed identifier minted "now".
///
/// Returning `None` means "never expires".
pub type ExpirationResolver = Arc<dyn Fn(Timestamp) -> Option<Timestamp> + Send + Sync>;

/// Configuration threaded through identifier creation and signed parsing.
#[derive(Clone)]
pub struct GlobalIdContext {
    app: Option<String>,
    verifier: Arc<Verifier>,
    expiration_resolver: ExpirationResolver,
}

impl GlobalIdContext {
    /// Build a context with a validated default app name and a verifier
    /// derived from the application secret.
    ///
    /// # Errors
    ///
    /// Fails when the app name violates the charset rule — a configuration
    /// bug, surfaced hard.
    pub fn new(app: &str, secret: impl AsRef<[u8]>) -> Result<Self, GlobalIdError> {
        let app = Gid::validate_app_name(app)?;
        Ok(Self {
            app: Some(app),
            verifier: Arc::new(Verifier::from_secret(secret)),
            expiration_resolver: default_expiration_resolver(),
        })
    }

    /// Build a context with no default app name.
    ///
    /// Creation calls must then supply the app per call or they fail with
    /// `MissingApp`.
    pub fn without_app(secret: impl AsRef<[u8]>) -> Self {
        Self {
            app: None,
            verifier: Arc::new(Verifier::from_secret(secret)),
            expiration_resolver: default_expiration_resolver(),
        }
    }

    /// Replace the verifier.
    pub fn with_verifier(mut self, verifier: Arc<Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Replace the default-expiration policy.
    pub fn with_expiration_resolver(
        mut self,
        resolver: impl Fn(Timestamp) -> Option<Timestamp> + Send + Sync + 'static,
    ) -> Self {
        self.expiration_resolver = Arc::new(resolver);
        self
    }

    /// Mint signed identifiers that never expire by default.
    pub fn never_expiring(self) -> Self {
        self.with_expiration_resolver(|_now| None)
    }

    /// The default app name, if configured.
    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    /// The configured verifier.
    pub fn verifier(&self) -> &Arc<Verifier> {
        &self.verifier
    }

    /// The default expiration for an identifier minted now.
    pub fn default_expiration(&self) -> Option<Timestamp> {
        (self.expiration_resolver)(Timestamp::now())
    }
}

impl std::fmt::Debug for GlobalIdContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalIdContext")
            .field("app", &self.app)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

/// Default policy: signed identifiers expire one month after minting.
fn default_expiration_resolver() -> ExpirationResolver {
    Arc::new(|now: Timestamp| now.checked_add_months(1))
}
