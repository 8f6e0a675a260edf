//! Binding records, one per registration.
//!
//! A binding pairs a capability and tag with a [`Provision`]: either a
//! constructor (registry-owned) or a fixed external instance.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{BeansError, Result};
use crate::key::CapabilityId;
use crate::ownership::Ownership;

/// Constructor for registry-owned instances of capability `I`.
pub type ConstructFn<I> = Box<dyn Fn() -> Box<I> + Send + Sync>;

/// How a binding produces values of capability `I`.
///
/// The two variants carry different cleanup rules: a constructed value
/// belongs to the handle, an instance belongs to whoever registered it.
pub enum Provision<I: ?Sized + 'static> {
    /// Builds a fresh instance per resolution.
    Construct(ConstructFn<I>),
    /// Hands out the same externally owned instance every time.
    Instance(&'static I),
}

impl<I: ?Sized + 'static> Provision<I> {
    /// The ownership kind this provision yields.
    pub fn ownership(&self) -> Ownership {
        match self {
            Provision::Construct(_) => Ownership::RegistryOwned,
            Provision::Instance(_) => Ownership::ExternallyOwned,
        }
    }
}

/// A single registration.
///
/// The typed [`Provision`] is stored type-erased; [`Binding::downcast`]
/// recovers it for the capability type it was registered under.
pub(crate) struct Binding {
    pub capability: CapabilityId,
    pub tag: String,
    pub ownership: Ownership,
    provision: Arc<dyn Any + Send + Sync>,
}

impl Binding {
    /// Creates a binding for capability `I`.
    pub fn new<I>(tag: &str, provision: Provision<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            capability: CapabilityId::of::<I>(),
            tag: tag.to_owned(),
            ownership: provision.ownership(),
            provision: Arc::new(provision),
        }
    }

    /// `true` if the binding carries no tag.
    #[inline]
    pub fn is_untagged(&self) -> bool {
        self.tag.is_empty()
    }

    /// Shares the type-erased provision, detached from the binding.
    pub fn provision_handle(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.provision)
    }

    /// Recovers the typed provision from a detached handle.
    pub fn downcast<I>(
        capability: CapabilityId,
        erased: &(dyn Any + Send + Sync),
    ) -> Result<&Provision<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        erased
            .downcast_ref::<Provision<I>>()
            .ok_or(BeansError::TypeMismatch {
                capability,
                expected: type_name::<I>(),
            })
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("capability", &self.capability)
            .field("tag", &self.tag)
            .field("ownership", &self.ownership)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Square;
    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    trait Lexer: Send + Sync {}

    static SQUARE: Square = Square;

    fn construct() -> Binding {
        Binding::new::<dyn Shape>(
            "",
            Provision::Construct(Box::new(|| Box::new(Square) as Box<dyn Shape>)),
        )
    }

    #[test]
    fn construct_binding_is_registry_owned() {
        let binding = construct();
        assert_eq!(binding.ownership, Ownership::RegistryOwned);
        assert_eq!(binding.capability, CapabilityId::of::<dyn Shape>());
        assert!(binding.is_untagged());
    }

    #[test]
    fn instance_binding_is_externally_owned() {
        let binding = Binding::new::<dyn Shape>("fixed", Provision::<dyn Shape>::Instance(&SQUARE));
        assert_eq!(binding.ownership, Ownership::ExternallyOwned);
        assert_eq!(binding.tag, "fixed");
        assert!(!binding.is_untagged());
    }

    #[test]
    fn provision_round_trips_through_erasure() {
        let binding = construct();
        let erased = binding.provision_handle();
        let provision = Binding::downcast::<dyn Shape>(binding.capability, &*erased).unwrap();
        match provision {
            Provision::Construct(factory) => assert_eq!(factory().sides(), 4),
            Provision::Instance(_) => panic!("expected a constructor"),
        }
    }

    #[test]
    fn downcast_to_wrong_capability_is_mismatch() {
        let binding = construct();
        let erased = binding.provision_handle();
        let result = Binding::downcast::<dyn Lexer>(binding.capability, &*erased);
        assert!(matches!(result, Err(BeansError::TypeMismatch { .. })));
    }

    #[test]
    fn debug_omits_factory() {
        let debug = format!("{:?}", construct());
        assert!(debug.contains("Binding"));
        assert!(debug.contains("RegistryOwned"));
    }
}
