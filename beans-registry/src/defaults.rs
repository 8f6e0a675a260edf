//! Link-time default implementations.
//!
//! A crate that ships the usual implementation of a capability can declare
//! it next to the type:
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct SystemClock;
//! impl Clock for SystemClock { ... }
//!
//! beans::default_implementation!(dyn Clock => SystemClock);
//! ```
//!
//! Every registry created with `load_defaults` set registers all such
//! declarations on its root, before anything else can touch it. Anything
//! registered later, on the root or in a session, takes precedence.

use tracing::{debug, info};

use crate::registry::Registry;

/// One `default_implementation!` declaration, collected by `inventory`.
pub struct DefaultImplementation {
    capability: &'static str,
    install: fn(&Registry),
}

impl DefaultImplementation {
    #[doc(hidden)]
    pub const fn new(capability: &'static str, install: fn(&Registry)) -> Self {
        Self {
            capability,
            install,
        }
    }

    /// The capability as written in the declaration.
    pub fn capability(&self) -> &'static str {
        self.capability
    }
}

inventory::collect!(DefaultImplementation);

/// Names of every declared default, in link order.
pub fn declared() -> Vec<&'static str> {
    inventory::iter::<DefaultImplementation>
        .into_iter()
        .map(DefaultImplementation::capability)
        .collect()
}

pub(crate) fn install_all(registry: &Registry) {
    let mut installed = 0usize;
    for entry in inventory::iter::<DefaultImplementation> {
        debug!(capability = entry.capability, "Installing default implementation");
        (entry.install)(registry);
        installed += 1;
    }
    info!(installed, "Default implementations loaded");
}

/// Declare the implementation a capability gets when nothing else is
/// registered for it.
///
/// The implementation type must implement [`Default`]; each resolution
/// builds a fresh one. An optional `tag = "..."` binds it under that tag.
#[macro_export]
macro_rules! default_implementation {
    ($cap:ty => $imp:ty $(, tag = $tag:expr)? $(,)?) => {
        const _: () = {
            fn install(registry: &$crate::Registry) {
                registry.register_tagged_implementation::<$cap>(
                    $crate::__tag_or_untagged!($($tag)?),
                    || {
                        ::std::boxed::Box::new(<$imp as ::core::default::Default>::default())
                            as ::std::boxed::Box<$cap>
                    },
                );
            }

            $crate::inventory::submit! {
                $crate::defaults::DefaultImplementation::new(::core::stringify!($cap), install)
            }
        };
    };
}

/// Register a [`Default`]-constructible implementation for a capability.
///
/// ```rust,ignore
/// register_implementation!(dyn Shape => Circle);
/// register_implementation!(dyn Shape => Square, tag = "boxy");
/// register_implementation!(in registry; dyn Shape => Circle);
/// ```
#[macro_export]
macro_rules! register_implementation {
    (in $registry:expr; $cap:ty => $imp:ty $(, tag = $tag:expr)? $(,)?) => {
        $registry.register_tagged_implementation::<$cap>(
            $crate::__tag_or_untagged!($($tag)?),
            || {
                ::std::boxed::Box::new(<$imp as ::core::default::Default>::default())
                    as ::std::boxed::Box<$cap>
            },
        )
    };
    ($cap:ty => $imp:ty $(, tag = $tag:expr)? $(,)?) => {
        $crate::register_implementation!(in $crate::Registry::global(); $cap => $imp $(, tag = $tag)?)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tag_or_untagged {
    () => {
        ""
    };
    ($tag:expr) => {
        $tag
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    trait Chime: Send + Sync {
        fn sound(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Bell;
    impl Chime for Bell {
        fn sound(&self) -> &'static str {
            "ding"
        }
    }

    #[derive(Default)]
    struct Gong;
    impl Chime for Gong {
        fn sound(&self) -> &'static str {
            "bong"
        }
    }

    crate::default_implementation!(dyn Chime => Bell);
    crate::default_implementation!(dyn Chime => Gong, tag = "deep");

    #[test]
    fn declarations_are_collected() {
        let names = declared();
        assert!(names.contains(&"dyn Chime"));
    }

    #[test]
    fn defaults_load_on_new_registry() {
        let registry = Registry::new();
        assert_eq!(registry.resolve::<dyn Chime>().unwrap().sound(), "ding");
        assert_eq!(registry.resolve_tagged::<dyn Chime>("deep").unwrap().sound(), "bong");
    }

    #[test]
    fn bare_registry_skips_defaults() {
        let registry = Registry::with_settings(Settings::bare());
        assert!(registry.resolve::<dyn Chime>().is_err());
        assert_eq!(registry.binding_count(), 0);
    }

    #[test]
    fn registrations_shadow_defaults() {
        let registry = Registry::new();
        crate::register_implementation!(in registry; dyn Chime => Gong);
        assert_eq!(registry.resolve::<dyn Chime>().unwrap().sound(), "bong");
    }

    #[test]
    fn macro_registers_tagged() {
        let registry = Registry::with_settings(Settings::bare());
        crate::register_implementation!(in registry; dyn Chime => Bell, tag = "light");
        let bean = registry.resolve_tagged::<dyn Chime>("light").unwrap();
        assert_eq!(bean.sound(), "ding");
    }
}
