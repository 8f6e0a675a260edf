//! Error types for registry operations.
//!
//! Registration never fails. Resolution fails with
//! [`BeansError::UnresolvedInterface`] when nothing in the chain matches.

use std::fmt;

use beans_support::rendering::render_layers;

use crate::key::CapabilityId;

/// Main error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum BeansError {
    /// No binding for the requested capability and tag anywhere in the
    /// active chain.
    #[error("{}", .0)]
    UnresolvedInterface(UnresolvedInterface),

    /// A binding's stored factory does not produce the requested type.
    #[error("Binding for {capability} does not provide {expected}")]
    TypeMismatch {
        capability: CapabilityId,
        expected: &'static str,
    },

    /// Settings were supplied after the global registry came up.
    #[error("The global registry is already initialized. Call configure() before the first registration or resolution")]
    AlreadyInitialized,
}

impl BeansError {
    /// Returns the resolution failure, if this is one.
    pub fn as_unresolved(&self) -> Option<&UnresolvedInterface> {
        match self {
            BeansError::UnresolvedInterface(e) => Some(e),
            _ => None,
        }
    }
}

/// A deep lookup found no binding.
///
/// Carries what was asked for, where it was searched, and similarly
/// named capabilities that *are* bound.
#[derive(Debug, Clone)]
pub struct UnresolvedInterface {
    /// The capability that was requested.
    pub capability: CapabilityId,
    /// The requested tag; `None` for an untagged request.
    pub tag: Option<String>,
    /// Labels of the searched layers, innermost first.
    pub searched: Vec<String>,
    /// Bound capabilities with a similar name.
    pub suggestions: Vec<String>,
}

impl UnresolvedInterface {
    /// Returns the requested tag, or `""` for an untagged request.
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

impl fmt::Display for UnresolvedInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Implementation for \"{}\"", self.capability.short_name())?;
        if let Some(ref tag) = self.tag {
            write!(f, " with tag \"{tag}\"")?;
        }
        write!(f, " was not declared")?;

        if !self.searched.is_empty() {
            write!(f, "\n  Searched: {}", render_layers(&self.searched))?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Convenient Result type for registry operations.
pub type Result<T> = std::result::Result<T, BeansError>;

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape {}

    fn unresolved(tag: Option<&str>) -> UnresolvedInterface {
        UnresolvedInterface {
            capability: CapabilityId::of::<dyn Shape>(),
            tag: tag.map(str::to_owned),
            searched: vec!["override #1".into(), "root".into()],
            suggestions: vec![],
        }
    }

    #[test]
    fn untagged_message_names_capability() {
        let msg = BeansError::UnresolvedInterface(unresolved(None)).to_string();
        assert!(msg.starts_with("Implementation for \"dyn Shape\" was not declared"));
        assert!(msg.contains("override #1 → root"));
        assert!(!msg.contains("tag"));
    }

    #[test]
    fn tagged_message_names_tag() {
        let msg = unresolved(Some("blue")).to_string();
        assert!(msg.contains("with tag \"blue\""));
    }

    #[test]
    fn empty_tag_accessor() {
        assert_eq!(unresolved(None).tag(), "");
        assert_eq!(unresolved(Some("x")).tag(), "x");
    }

    #[test]
    fn suggestions_are_listed() {
        let mut err = unresolved(None);
        err.suggestions = vec!["dyn Shapes".into()];
        assert!(err.to_string().contains("Did you mean one of:\n    - dyn Shapes"));
    }

    #[test]
    fn as_unresolved_only_matches_resolution_errors() {
        assert!(BeansError::UnresolvedInterface(unresolved(None)).as_unresolved().is_some());
        assert!(BeansError::AlreadyInitialized.as_unresolved().is_none());
    }
}
