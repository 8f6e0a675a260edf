//! Who owns a resolved instance.
//!
//! - [`Ownership::RegistryOwned`]: the binding constructs a fresh
//!   instance per handle, and the handle owns it
//! - [`Ownership::ExternallyOwned`]: the binding hands out one instance
//!   supplied by the registrant; handles only borrow it
use std::fmt;

/// Ownership kind of a binding, and of the handles resolved from it.
///
/// # Examples
/// ```
/// use beans_registry::ownership::Ownership;
///
/// assert!(Ownership::RegistryOwned.constructs());
/// assert!(!Ownership::ExternallyOwned.constructs());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Built by the binding's factory on every resolution.
    ///
    /// The resolving handle is the sole owner and drops the instance
    /// together with its last clone.
    RegistryOwned,

    /// A fixed instance registered from outside.
    ///
    /// Every handle borrows the same instance; dropping handles never
    /// drops it.
    ExternallyOwned,
}

impl Ownership {
    /// Returns `true` if resolving runs a constructor.
    #[inline]
    pub fn constructs(&self) -> bool {
        matches!(self, Ownership::RegistryOwned)
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::RegistryOwned => write!(f, "registry-owned"),
            Ownership::ExternallyOwned => write!(f, "externally-owned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_registry_owned_constructs() {
        assert!(Ownership::RegistryOwned.constructs());
        assert!(!Ownership::ExternallyOwned.constructs());
    }

    #[test]
    fn ownership_display() {
        assert_eq!(Ownership::RegistryOwned.to_string(), "registry-owned");
        assert_eq!(Ownership::ExternallyOwned.to_string(), "externally-owned");
    }
}
