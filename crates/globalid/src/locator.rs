//! # Locator — Per-App Resolution Dispatch
//!
//! A registry mapping app names to resolution strategies, plus the batch and
//! signed variants of dispatch. Apps without a registered strategy fall back
//! to the built-in [`BaseLocator`].
//!
//! ## Concurrency
//!
//! The route map is built during process setup (`register` takes
//! `&mut self`) and is read-only afterwards; concurrent readers need no
//! further synchronization. Runtime re-registration, if a host ever needs
//! it, must be serialized externally.
//!
//! ## Batch routing
//!
//! `locate_many` dispatches the whole surviving batch through the strategy
//! of the *first* surviving element. Mixed-app batches therefore route
//! through one strategy, a documented limitation of Rails' GlobalID that is
//! deliberately preserved here.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use globalid_core::{Gid, Locatable};

use crate::context::GlobalIdContext;
use crate::error::LocatorError;
use crate::global_id::GlobalId;
use crate::model::{ExactMatch, ModelFinder, ModelHierarchy};
use crate::signed_global_id::{SignedGlobalId, SignedParseOptions};

/// Options for single resolution.
#[derive(Debug, Default, Clone)]
pub struct LocateOptions {
    /// Accept only these model types (empty accepts everything). Matching
    /// consults the locator's [`ModelHierarchy`], so entries may name
    /// supertypes.
    pub only: Vec<String>,
}

/// Options for batch resolution.
#[derive(Debug, Default, Clone)]
pub struct LocateManyOptions {
    /// Accept only these model types (empty accepts everything).
    pub only: Vec<String>,
    /// Hold `None` at missing positions instead of failing the whole batch.
    pub ignore_missing: bool,
}

/// Options for single signed resolution.
#[derive(Debug, Default, Clone)]
pub struct SignedLocateOptions {
    /// The purpose the envelope must have been minted for.
    pub purpose: Option<String>,
    /// Accept only these model types (empty accepts everything).
    pub only: Vec<String>,
}

/// Options for batch signed resolution.
#[derive(Debug, Default, Clone)]
pub struct SignedLocateManyOptions {
    /// The purpose the envelopes must have been minted for.
    pub purpose: Option<String>,
    /// Accept only these model types (empty accepts everything).
    pub only: Vec<String>,
    /// Hold `None` at missing positions instead of failing the whole batch.
    pub ignore_missing: bool,
}

/// The capability a resolution strategy provides.
///
/// Resolved entities are shared handles: a batch may name the same entity
/// more than once, and every one of those positions gets it.
pub trait LocatorContract: Send + Sync {
    /// Resolve one identifier; absence is `Ok(None)`.
    fn locate(&self, global_id: &GlobalId) -> Result<Option<Arc<dyn Locatable>>, LocatorError>;

    /// Resolve a batch, preserving input order.
    ///
    /// A missing entry is `None` when `ignore_missing` is set; otherwise the
    /// whole batch fails with [`LocatorError::BatchEntryMissing`].
    fn locate_many(
        &self,
        global_ids: &[GlobalId],
        options: &LocateManyOptions,
    ) -> Result<Vec<Option<Arc<dyn Locatable>>>, LocatorError>;
}

/// The built-in strategy: resolve through the repository capability.
pub struct BaseLocator {
    finder: Arc<dyn ModelFinder>,
}

impl BaseLocator {
    /// Create a strategy backed by the given repository.
    pub fn new(finder: Arc<dyn ModelFinder>) -> Self {
        Self { finder }
    }
}

impl LocatorContract for BaseLocator {
    fn locate(&self, global_id: &GlobalId) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        self.finder
            .find(global_id.model_name(), global_id.model_id())
    }

    fn locate_many(
        &self,
        global_ids: &[GlobalId],
        options: &LocateManyOptions,
    ) -> Result<Vec<Option<Arc<dyn Locatable>>>, LocatorError> {
        // One bulk lookup per model type, groups in first-seen order.
        let mut ids_by_model: IndexMap<String, Vec<String>> = IndexMap::new();
        for global_id in global_ids {
            ids_by_model
                .entry(global_id.model_name().to_string())
                .or_default()
                .push(global_id.model_id().to_string());
        }

        let mut loaded: HashMap<(String, String), Arc<dyn Locatable>> = HashMap::new();
        for (model_name, model_ids) in &ids_by_model {
            for found in self.finder.find_many(model_name, model_ids)? {
                loaded.insert((found.model_name(), found.model_key()), found);
            }
        }

        // Reassemble in the original input order. Lookups do not consume the
        // map, so an identifier appearing twice resolves at both positions.
        global_ids
            .iter()
            .map(|global_id| {
                let key = (
                    global_id.model_name().to_string(),
                    global_id.model_id().to_string(),
                );
                match loaded.get(&key) {
                    Some(model) => Ok(Some(Arc::clone(model))),
                    None if options.ignore_missing => Ok(None),
                    None => Err(LocatorError::BatchEntryMissing),
                }
            })
            .collect()
    }
}

/// Per-app registry of resolution strategies.
pub struct Locator {
    routes: HashMap<String, Arc<dyn LocatorContract>>,
    default_locator: Arc<dyn LocatorContract>,
    hierarchy: Arc<dyn ModelHierarchy>,
}

impl Locator {
    /// Create a locator whose default strategy resolves through the given
    /// repository, with exact-match type filtering.
    pub fn new(finder: Arc<dyn ModelFinder>) -> Self {
        Self {
            routes: HashMap::new(),
            default_locator: Arc::new(BaseLocator::new(finder)),
            hierarchy: Arc::new(ExactMatch),
        }
    }

    /// Replace the type hierarchy consulted by the `only` filter.
    pub fn with_hierarchy(mut self, hierarchy: Arc<dyn ModelHierarchy>) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Register a strategy for an app. Keys are case-insensitive.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidApp` when the app name violates the charset rule —
    /// a setup bug, surfaced hard.
    pub fn register(
        &mut self,
        app: &str,
        locator: Arc<dyn LocatorContract>,
    ) -> Result<(), LocatorError> {
        let app = Gid::validate_app_name(app).map_err(LocatorError::InvalidApp)?;
        self.routes.insert(app.to_lowercase(), locator);
        Ok(())
    }

    /// Resolve one identifier.
    ///
    /// Returns `Ok(None)` when the `only` filter rejects it or the entity no
    /// longer exists.
    pub fn locate(
        &self,
        global_id: &GlobalId,
        options: &LocateOptions,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        if !self.permitted(global_id, &options.only) {
            tracing::debug!(model = global_id.model_name(), "filtered by only");
            return Ok(None);
        }
        self.locator_for(global_id).locate(global_id)
    }

    /// Parse then resolve a canonical or compact-encoded identifier string.
    pub fn locate_str(
        &self,
        value: &str,
        options: &LocateOptions,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        match GlobalId::parse(value) {
            Some(global_id) => self.locate(&global_id, options),
            None => Ok(None),
        }
    }

    /// Resolve a batch of identifiers.
    ///
    /// Identifiers rejected by the `only` filter are dropped before
    /// batching; an entirely filtered batch yields an empty vec. The
    /// surviving batch dispatches through the strategy of its first element.
    pub fn locate_many(
        &self,
        global_ids: &[GlobalId],
        options: &LocateManyOptions,
    ) -> Result<Vec<Option<Arc<dyn Locatable>>>, LocatorError> {
        let surviving: Vec<GlobalId> = global_ids
            .iter()
            .filter(|global_id| self.permitted(global_id, &options.only))
            .cloned()
            .collect();
        let Some(first) = surviving.first() else {
            return Ok(Vec::new());
        };
        self.locator_for(first).locate_many(&surviving, options)
    }

    /// Verify, parse, then resolve a signed identifier token.
    pub fn locate_signed(
        &self,
        token: &str,
        ctx: &GlobalIdContext,
        options: &SignedLocateOptions,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError> {
        let parse_options = SignedParseOptions {
            purpose: options.purpose.clone(),
        };
        match SignedGlobalId::parse(token, ctx, &parse_options) {
            Some(sgid) => self.locate(
                &sgid.to_global_id(),
                &LocateOptions {
                    only: options.only.clone(),
                },
            ),
            None => Ok(None),
        }
    }

    /// Verify, parse, then batch-resolve signed identifier tokens.
    ///
    /// Tokens failing verification are dropped before batching, like
    /// filtered entries.
    pub fn locate_many_signed<S: AsRef<str>>(
        &self,
        tokens: &[S],
        ctx: &GlobalIdContext,
        options: &SignedLocateManyOptions,
    ) -> Result<Vec<Option<Arc<dyn Locatable>>>, LocatorError> {
        let parse_options = SignedParseOptions {
            purpose: options.purpose.clone(),
        };
        let verified: Vec<GlobalId> = tokens
            .iter()
            .filter_map(|token| SignedGlobalId::parse(token.as_ref(), ctx, &parse_options))
            .map(|sgid| sgid.to_global_id())
            .collect();
        self.locate_many(
            &verified,
            &LocateManyOptions {
                only: options.only.clone(),
                ignore_missing: options.ignore_missing,
            },
        )
    }

    fn locator_for(&self, global_id: &GlobalId) -> &Arc<dyn LocatorContract> {
        self.routes
            .get(&global_id.app().to_lowercase())
            .unwrap_or(&self.default_locator)
    }

    fn permitted(&self, global_id: &GlobalId, only: &[String]) -> bool {
        only.is_empty()
            || only
                .iter()
                .any(|candidate| self.hierarchy.conforms(global_id.model_name(), candidate))
    }
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
