//! # The Registry
//!
//! A registry context owns the chain of binding layers and the lock that
//! serializes every operation on it.
//!
//! # Architecture
//! ```text
//!   register_*()  ──append──>  leaf node
//!                                 │ child of
//!   Session::open() ──push──>  ...  ──>  root node
//!
//!   Bean::new()  ──deep lookup: leaf → ... → root──>  first match
//! ```
//!
//! Most programs use the process-wide registry through the free functions
//! in this module and [`Bean::new`]. Tests that want full isolation can
//! build their own [`Registry`].
//!
//! # Examples
//! ```rust
//! use beans_registry::prelude::*;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! struct French;
//! impl Greeter for French {
//!     fn greet(&self) -> String { "bonjour".into() }
//! }
//!
//! let registry = Registry::with_settings(Settings::bare());
//! registry.register_implementation::<dyn Greeter>(|| Box::new(English));
//!
//! {
//!     let _session = registry.open_session();
//!     registry.register_implementation::<dyn Greeter>(|| Box::new(French));
//!     let greeter = registry.resolve::<dyn Greeter>().expect("bound in session");
//!     assert_eq!(greeter.greet(), "bonjour");
//! }
//!
//! let greeter = registry.resolve::<dyn Greeter>().expect("bound on root");
//! assert_eq!(greeter.greet(), "hello");
//! ```

use std::cell::RefCell;
use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, info, instrument};

use crate::bean::Bean;
use crate::binding::{Binding, Provision};
use crate::defaults;
use crate::error::{BeansError, Result};
use crate::key::CapabilityId;
use crate::node::Chain;
use crate::session::Session;
use crate::settings::Settings;

static GLOBAL_SETTINGS: OnceCell<Settings> = OnceCell::new();

static GLOBAL: Lazy<Registry> = Lazy::new(|| {
    let settings = GLOBAL_SETTINGS.get_or_init(Settings::default).clone();
    info!(?settings, "Initializing global registry");
    Registry::with_settings(settings)
});

// ═══════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════

/// A registry context: the binding chain plus its reentrant lock.
///
/// Registration, resolution and session open/close all take the same
/// lock. A thread may take it again while holding it, so resolving inside
/// one's own session works; other threads block until it is released.
pub struct Registry {
    state: ReentrantMutex<RefCell<Chain>>,
    settings: Settings,
}

impl Registry {
    /// Create an isolated registry with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create an isolated registry.
    ///
    /// If `settings.load_defaults` is set, every declared default
    /// implementation is registered on the new root.
    #[instrument(name = "registry_init")]
    pub fn with_settings(settings: Settings) -> Self {
        let registry = Self {
            state: ReentrantMutex::new(RefCell::new(Chain::new(settings.strict_tags))),
            settings,
        };
        if registry.settings.load_defaults {
            defaults::install_all(&registry);
        }
        registry
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Registration ──

    /// Bind capability `I` to a constructor, untagged.
    ///
    /// Every resolution runs `factory` and the resulting handle owns the
    /// instance.
    ///
    /// ```rust,ignore
    /// registry.register_implementation::<dyn Shape>(|| Box::new(Circle::default()));
    /// ```
    pub fn register_implementation<I>(&self, factory: impl Fn() -> Box<I> + Send + Sync + 'static)
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register_tagged_implementation::<I>("", factory);
    }

    /// Bind capability `I` to a constructor under `tag`.
    pub fn register_tagged_implementation<I>(
        &self,
        tag: &str,
        factory: impl Fn() -> Box<I> + Send + Sync + 'static,
    ) where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register(tag, Provision::Construct(Box::new(factory)));
    }

    /// Bind capability `I` to an instance the caller keeps owning, untagged.
    ///
    /// The `'static` borrow guarantees the instance outlives every handle
    /// and session that can reach it.
    pub fn register_instance<I>(&self, instance: &'static I)
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register_tagged_instance::<I>("", instance);
    }

    /// Bind capability `I` to an externally owned instance under `tag`.
    pub fn register_tagged_instance<I>(&self, tag: &str, instance: &'static I)
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register(tag, Provision::Instance(instance));
    }

    fn register<I>(&self, tag: &str, provision: Provision<I>)
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let binding = Binding::new(tag, provision);
        let state = self.lock();
        let mut chain = state.borrow_mut();
        debug!(
            capability = %binding.capability,
            tag,
            ownership = %binding.ownership,
            depth = chain.depth(),
            "Registered binding"
        );
        chain.leaf_mut().register(binding);
    }

    // ── Resolution ──

    /// Resolve capability `I`, untagged.
    pub fn resolve<I>(&self) -> Result<Bean<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Bean::resolve_in(self, "")
    }

    /// Resolve capability `I` with `tag`.
    pub fn resolve_tagged<I>(&self, tag: &str) -> Result<Bean<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Bean::resolve_in(self, tag)
    }

    // ── Scoping ──

    /// Open an override session on this registry.
    ///
    /// Blocks until the lock is available, then holds it until the session
    /// is closed, dropped or unlocked.
    pub fn open_session(&self) -> Session<'_> {
        Session::open_in(self)
    }

    // ── Introspection ──

    /// Number of open override layers above the root.
    pub fn depth(&self) -> usize {
        self.lock().borrow().depth()
    }

    /// Number of bindings across the whole chain.
    pub fn binding_count(&self) -> usize {
        self.lock().borrow().binding_count()
    }

    /// Capabilities bound anywhere in the chain.
    pub fn bound_capabilities(&self) -> Vec<CapabilityId> {
        self.lock().borrow().bound_capabilities()
    }

    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, RefCell<Chain>> {
        self.state.lock()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        let chain = state.borrow();
        f.debug_struct("Registry")
            .field("depth", &chain.depth())
            .field("bindings", &chain.binding_count())
            .field("settings", &self.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Global entry points
// ═══════════════════════════════════════════

/// Fix the settings of the global registry.
///
/// Must run before anything touches the global registry.
///
/// # Errors
/// [`BeansError::AlreadyInitialized`] if the global registry exists or
/// settings were already supplied.
pub fn configure(settings: Settings) -> Result<()> {
    if Lazy::get(&GLOBAL).is_some() {
        return Err(BeansError::AlreadyInitialized);
    }
    GLOBAL_SETTINGS
        .set(settings)
        .map_err(|_| BeansError::AlreadyInitialized)
}

/// Bind capability `I` to a constructor on the global registry's leaf.
pub fn register_implementation<I>(factory: impl Fn() -> Box<I> + Send + Sync + 'static)
where
    I: ?Sized + Send + Sync + 'static,
{
    Registry::global().register_implementation::<I>(factory);
}

/// Tagged form of [`register_implementation`].
pub fn register_tagged_implementation<I>(
    tag: &str,
    factory: impl Fn() -> Box<I> + Send + Sync + 'static,
) where
    I: ?Sized + Send + Sync + 'static,
{
    Registry::global().register_tagged_implementation::<I>(tag, factory);
}

/// Bind capability `I` to an externally owned instance on the global
/// registry's leaf.
pub fn register_instance<I>(instance: &'static I)
where
    I: ?Sized + Send + Sync + 'static,
{
    Registry::global().register_instance::<I>(instance);
}

/// Tagged form of [`register_instance`].
pub fn register_tagged_instance<I>(tag: &str, instance: &'static I)
where
    I: ?Sized + Send + Sync + 'static,
{
    Registry::global().register_tagged_instance::<I>(tag, instance);
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{
        Registry, configure, register_implementation, register_instance,
        register_tagged_implementation, register_tagged_instance,
    };
    pub use crate::bean::Bean;
    pub use crate::error::{BeansError, Result, UnresolvedInterface};
    pub use crate::key::CapabilityId;
    pub use crate::ownership::Ownership;
    pub use crate::session::Session;
    pub use crate::settings::Settings;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
