//! Global settings must be fixed before the registry is first used, so
//! this binary holds a single test.

use beans::prelude::*;

trait Theme: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Dark;
impl Theme for Dark {
    fn name(&self) -> &'static str {
        "dark"
    }
}

#[test]
fn configure_global_registry_once() {
    configure(Settings::bare().with_strict_tags(true)).expect("first configure");
    assert!(matches!(
        configure(Settings::default()),
        Err(BeansError::AlreadyInitialized)
    ));

    let registry = Registry::global();
    assert_eq!(registry.settings(), &Settings::bare().with_strict_tags(true));

    register_implementation::<dyn Theme>(|| Box::new(Dark));
    assert_eq!(Bean::<dyn Theme>::new().unwrap().name(), "dark");

    let err = Bean::<dyn Theme>::tagged("high-contrast").unwrap_err();
    assert_eq!(err.as_unresolved().unwrap().tag(), "high-contrast");
}
