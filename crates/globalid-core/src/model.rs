//! # Model Identification Capability
//!
//! The capability an entity type implements to participate in global
//! identification. This replaces dynamic "ask the object for its class and
//! key" access with an explicit trait: an entity states its stored type tag
//! and primary key, and nothing in the stack inspects concrete types.
//!
//! The type tag is the *stored* name — it may be an alias registered with the
//! host application's morph map rather than the Rust type name.

use std::any::Any;

/// Identification capability for entities that can be referred to by a
/// `gid://` URI.
pub trait Locatable: Any + Send + Sync {
    /// The stored type tag identifying this entity's concrete type.
    fn model_name(&self) -> String;

    /// The entity's primary key, rendered as a string.
    fn model_key(&self) -> String;

    /// Downcasting access for callers that need the concrete type back after
    /// resolution.
    fn as_any(&self) -> &dyn Any;
}
