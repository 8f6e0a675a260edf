//! Lazy handles to resolved capabilities.
//!
//! A [`Bean`] resolves once, when it is constructed, and afterwards just
//! dereferences to what it found. Keep one per consuming field:
//!
//! ```rust
//! use beans_registry::prelude::*;
//!
//! trait Lexer: Send + Sync {
//!     fn tokens(&self, input: &str) -> Vec<String>;
//! }
//!
//! struct Whitespace;
//! impl Lexer for Whitespace {
//!     fn tokens(&self, input: &str) -> Vec<String> {
//!         input.split_whitespace().map(str::to_owned).collect()
//!     }
//! }
//!
//! struct Parser {
//!     lexer: Bean<dyn Lexer>,
//! }
//!
//! register_implementation::<dyn Lexer>(|| Box::new(Whitespace));
//! let parser = Parser { lexer: Bean::new().expect("lexer bound") };
//! assert_eq!(parser.lexer.tokens("1 + 2").len(), 3);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use beans_support::rendering::{short_type_name, similar_names};
use tracing::{instrument, trace};

use crate::binding::{Binding, Provision};
use crate::error::{BeansError, Result, UnresolvedInterface};
use crate::key::CapabilityId;
use crate::node::Chain;
use crate::ownership::Ownership;
use crate::registry::Registry;

const MAX_SUGGESTIONS: usize = 3;

/// What a handle holds, per ownership kind.
enum Held<I: ?Sized + 'static> {
    /// Built for this handle; shared only with clones of it.
    Owned(Arc<I>),
    /// Borrowed from the registrant, never dropped by the handle.
    Borrowed(&'static I),
}

/// A resolved reference to capability `I`.
///
/// Resolution happens in the constructor. To pick up a different binding
/// (say, after a session closes) construct a new handle.
pub struct Bean<I: ?Sized + 'static> {
    held: Held<I>,
    capability: CapabilityId,
}

impl<I> Bean<I>
where
    I: ?Sized + Send + Sync + 'static,
{
    /// Resolve the untagged binding for `I` from the global registry.
    ///
    /// # Errors
    /// [`BeansError::UnresolvedInterface`] if no layer has a match.
    pub fn new() -> Result<Self> {
        Self::resolve_in(Registry::global(), "")
    }

    /// Resolve `I` with `tag` from the global registry.
    pub fn tagged(tag: &str) -> Result<Self> {
        Self::resolve_in(Registry::global(), tag)
    }

    #[instrument(
        level = "trace",
        name = "bean_resolve",
        skip(registry),
        fields(capability = %short_type_name(std::any::type_name::<I>()))
    )]
    pub(crate) fn resolve_in(registry: &Registry, tag: &str) -> Result<Self> {
        let capability = CapabilityId::of::<I>();
        let state = registry.lock();

        // Release the borrow before running the factory: it may resolve
        // or register on this same registry.
        let (ownership, erased) = {
            let chain = state.borrow();
            match chain.deep_lookup(&capability, tag) {
                Some(binding) => (binding.ownership, binding.provision_handle()),
                None => {
                    let err = unresolved(&chain, capability, tag);
                    trace!(error = %err, "No binding found");
                    return Err(err);
                }
            }
        };

        if ownership.constructs() {
            trace!("Running factory");
        }
        let held = match Binding::downcast::<I>(capability, &*erased)? {
            Provision::Construct(factory) => Held::Owned(Arc::from(factory())),
            Provision::Instance(instance) => Held::Borrowed(*instance),
        };
        trace!(%ownership, "Resolved");

        Ok(Self { held, capability })
    }
}

impl<I: ?Sized + 'static> Bean<I> {
    /// The resolved instance.
    #[inline]
    pub fn get(&self) -> &I {
        match &self.held {
            Held::Owned(owned) => &**owned,
            Held::Borrowed(borrowed) => *borrowed,
        }
    }

    /// Whether this handle owns its instance or borrows it.
    pub fn ownership(&self) -> Ownership {
        match self.held {
            Held::Owned(_) => Ownership::RegistryOwned,
            Held::Borrowed(_) => Ownership::ExternallyOwned,
        }
    }

    /// The capability this handle was resolved for.
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    /// `true` if both handles point at the very same instance.
    pub fn same_instance(&self, other: &Bean<I>) -> bool {
        std::ptr::addr_eq(self.get() as *const I, other.get() as *const I)
    }
}

/// Cloning shares the instance; it never resolves again.
impl<I: ?Sized + 'static> Clone for Bean<I> {
    fn clone(&self) -> Self {
        let held = match &self.held {
            Held::Owned(owned) => Held::Owned(Arc::clone(owned)),
            Held::Borrowed(borrowed) => Held::Borrowed(*borrowed),
        };
        Self {
            held,
            capability: self.capability,
        }
    }
}

impl<I: ?Sized + 'static> Deref for Bean<I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.get()
    }
}

impl<I: ?Sized + 'static> AsRef<I> for Bean<I> {
    fn as_ref(&self) -> &I {
        self.get()
    }
}

impl<I: ?Sized + 'static> fmt::Debug for Bean<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("capability", &self.capability.short_name())
            .field("ownership", &self.ownership())
            .finish()
    }
}

fn unresolved(chain: &Chain, capability: CapabilityId, tag: &str) -> BeansError {
    let bound = chain.bound_capabilities();
    let names: Vec<&str> = bound.iter().map(CapabilityId::type_name).collect();
    let suggestions = similar_names(capability.type_name(), &names, MAX_SUGGESTIONS)
        .into_iter()
        .map(short_type_name)
        .collect();

    BeansError::UnresolvedInterface(UnresolvedInterface {
        capability,
        tag: (!tag.is_empty()).then(|| tag.to_owned()),
        searched: chain.layer_labels(),
        suggestions,
    })
}
