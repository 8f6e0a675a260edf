//! Registry settings.
//!
//! Settings are fixed when a registry is created. For the global registry
//! that means calling [`configure`](crate::registry::configure) before its
//! first use; isolated registries take them in
//! [`Registry::with_settings`](crate::registry::Registry::with_settings).

use serde::Deserialize;

/// Behavior switches for a registry.
///
/// Deserializable so applications can keep them next to the rest of their
/// configuration. Missing fields take their defaults.
///
/// ```
/// use beans_registry::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.load_defaults);
/// assert!(!settings.strict_tags);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Register every `default_implementation!` declaration on the root
    /// when the registry is created.
    pub load_defaults: bool,

    /// A tagged request only matches bindings with exactly that tag,
    /// instead of falling back to untagged and then to any binding.
    pub strict_tags: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            load_defaults: true,
            strict_tags: false,
        }
    }
}

impl Settings {
    /// Settings for a registry that starts out completely empty.
    pub fn bare() -> Self {
        Self {
            load_defaults: false,
            ..Self::default()
        }
    }

    pub fn with_strict_tags(mut self, strict: bool) -> Self {
        self.strict_tags = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_skips_defaults() {
        assert!(!Settings::bare().load_defaults);
        assert!(!Settings::bare().strict_tags);
    }

    #[test]
    fn deserialize_partial_table() {
        let settings: Settings = toml::from_str("strict_tags = true").unwrap();
        assert_eq!(
            settings,
            Settings {
                load_defaults: true,
                strict_tags: true,
            }
        );
    }

    #[test]
    fn deserialize_empty_table_is_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
