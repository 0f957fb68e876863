//! # Repository and Type-Hierarchy Capabilities
//!
//! The seams to the external collaborators: the persistence layer
//! ([`ModelFinder`]) and the host application's type-alias registry
//! ([`ModelHierarchy`]). Both are traits so the stack never touches a
//! database or inspects concrete types.

use std::sync::Arc;

use globalid_core::Locatable;

use crate::context::GlobalIdContext;
use crate::error::{GlobalIdError, LocatorError};
use crate::global_id::{CreateOptions, GlobalId};
use crate::signed_global_id::{SignedCreateOptions, SignedGlobalId};

/// Repository capability: fetch entities by stored type tag and primary key.
///
/// Entities come back as shared handles; batch resolution may hand the same
/// entity out at several positions.
pub trait ModelFinder: Send + Sync {
    /// Fetch one entity. Absence is `Ok(None)`, not an error.
    fn find(
        &self,
        model_name: &str,
        model_id: &str,
    ) -> Result<Option<Arc<dyn Locatable>>, LocatorError>;

    /// Fetch a batch of entities of one type. Missing ids are simply absent
    /// from the result; the caller reassembles and decides how to treat
    /// holes.
    fn find_many(
        &self,
        model_name: &str,
        model_ids: &[String],
    ) -> Result<Vec<Arc<dyn Locatable>>, LocatorError>;
}

/// Type-hierarchy capability used by the `only` filter.
///
/// `conforms(tag, candidate)` answers whether the stored type tag names
/// `candidate` or one of its registered supertypes. The host application
/// wires its alias registry in here; without one, [`ExactMatch`] applies.
pub trait ModelHierarchy: Send + Sync {
    /// Whether `model_name` is, or conforms to, `candidate`.
    fn conforms(&self, model_name: &str, candidate: &str) -> bool;
}

/// The default hierarchy: a tag conforms only to itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatch;

impl ModelHierarchy for ExactMatch {
    fn conforms(&self, model_name: &str, candidate: &str) -> bool {
        model_name == candidate
    }
}

/// Convenience surface for identifiable entities.
///
/// Blanket-implemented for every [`Locatable`] type, mirroring the
/// `GlobalID::Identification` model mixin of Rails.
pub trait HasGlobalIdentification: Locatable + Sized {
    /// Create a plain global identifier for this entity.
    fn to_global_id(
        &self,
        ctx: &GlobalIdContext,
        options: CreateOptions,
    ) -> Result<GlobalId, GlobalIdError> {
        GlobalId::create(self, ctx, options)
    }

    /// Alias for [`HasGlobalIdentification::to_global_id`].
    fn to_gid(
        &self,
        ctx: &GlobalIdContext,
        options: CreateOptions,
    ) -> Result<GlobalId, GlobalIdError> {
        self.to_global_id(ctx, options)
    }

    /// Create a signed global identifier for this entity.
    fn to_signed_global_id(
        &self,
        ctx: &GlobalIdContext,
        options: SignedCreateOptions,
    ) -> Result<SignedGlobalId, GlobalIdError> {
        SignedGlobalId::create(self, ctx, options)
    }

    /// Alias for [`HasGlobalIdentification::to_signed_global_id`].
    fn to_sgid(
        &self,
        ctx: &GlobalIdContext,
        options: SignedCreateOptions,
    ) -> Result<SignedGlobalId, GlobalIdError> {
        self.to_signed_global_id(ctx, options)
    }
}

impl<T: Locatable + Sized> HasGlobalIdentification for T {}
