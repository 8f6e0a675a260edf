//! Capability identification.
//!
//! [`CapabilityId`] names the abstract contract a binding satisfies.
//! It wraps the [`TypeId`] of the capability type (usually a `dyn Trait`)
//! and remembers the type name for diagnostics.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use beans_support::rendering::short_type_name;

/// Uniquely identifies a capability in the registry.
///
/// One identity exists per capability type, independent of how many
/// implementations are bound to it. Tags are not part of the identity;
/// they discriminate bindings *within* a capability.
///
/// # Examples
/// ```
/// use beans_registry::key::CapabilityId;
///
/// trait Shape {}
///
/// let id = CapabilityId::of::<dyn Shape>();
/// assert_eq!(id.short_name(), "dyn Shape");
/// assert_eq!(id, CapabilityId::of::<dyn Shape>());
/// ```
#[derive(Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    type_name: &'static str,
}

impl CapabilityId {
    /// Creates the identity of capability `I`.
    #[inline]
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            type_name: type_name::<I>(),
        }
    }

    /// Returns the [`TypeId`] of the capability type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified capability type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name without module paths.
    pub fn short_name(&self) -> String {
        short_type_name(self.type_name)
    }
}

// Identity is the TypeId alone; the name is only for humans.
impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityId({})", self.type_name)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
