//! Override sessions.
//!
//! A session pushes an empty binding layer on open and removes it on
//! close, so anything registered in between shadows the outer layers only
//! for the session's duration. It is the tool for swapping in mocks:
//!
//! ```rust,ignore
//! let _session = Session::open();
//! register_instance::<dyn Lexer>(&MOCK_LEXER);
//! let parser = Parser::new()?; // resolves the mock
//! ```
//!
//! The session holds the registry lock from open until close, so the
//! override is invisible to (and blocks) every other thread.

use std::cell::RefCell;
use std::fmt;

use parking_lot::ReentrantMutexGuard;
use tracing::debug;

use crate::node::{Chain, Detached, LayerId};
use crate::registry::Registry;

/// RAII controller for one override layer.
///
/// Sessions nest on the same thread and must close in reverse order of
/// opening. Closing out of order drops the inner layers along with this
/// one and logs a warning.
pub struct Session<'r> {
    registry: &'r Registry,
    layer: Option<LayerId>,
    guard: Option<ReentrantMutexGuard<'r, RefCell<Chain>>>,
}

impl Session<'static> {
    /// Open a session on the global registry.
    pub fn open() -> Self {
        Registry::global().open_session()
    }
}

impl<'r> Session<'r> {
    pub(crate) fn open_in(registry: &'r Registry) -> Self {
        let guard = registry.lock();
        let layer = guard.borrow_mut().push_layer();
        debug!(layer, "Override session opened");
        Self {
            registry,
            layer: Some(layer),
            guard: Some(guard),
        }
    }

    /// Detach this session's layer and release the lock.
    ///
    /// Calling it again, or dropping a closed session, does nothing.
    pub fn close(&mut self) {
        let Some(layer) = self.layer.take() else {
            return;
        };

        // After unlock() the guard is gone; take the lock just for the detach.
        let guard = match self.guard.take() {
            Some(guard) => guard,
            None => self.registry.lock(),
        };
        let (outcome, detached) = guard.borrow_mut().detach(layer);
        drop(guard);
        drop(detached);

        match outcome {
            Detached::Leaf => debug!(layer, "Override session closed"),
            Detached::OutOfOrder { discarded } => {
                debug!(layer, discarded, "Override session closed with inner layers")
            }
            Detached::Missing => debug!(layer, "Override session closed after its layer was dropped"),
        }
    }

    /// Release the lock but keep the override layer in place.
    ///
    /// Handy when set-up must run under the lock (register mocks, build
    /// the objects under test) and the rest may run unlocked. Other threads
    /// can then see, register into and open sessions on top of this layer.
    pub fn unlock(&mut self) {
        if self.guard.take().is_some() {
            debug!(layer = self.layer, "Override session unlocked");
        }
    }

    /// `true` until [`close`](Self::close) runs.
    pub fn is_open(&self) -> bool {
        self.layer.is_some()
    }

    /// `true` while the session holds the registry lock.
    pub fn holds_lock(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("layer", &self.layer)
            .field("holds_lock", &self.holds_lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use once_cell::sync::Lazy;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    trait Tone: Send + Sync {
        fn pitch(&self) -> u32;
    }

    struct Hz(u32);
    impl Tone for Hz {
        fn pitch(&self) -> u32 {
            self.0
        }
    }

    fn bare() -> Registry {
        Registry::with_settings(Settings::bare())
    }

    #[test]
    fn close_is_idempotent() {
        let registry = bare();
        let mut session = registry.open_session();
        assert!(session.is_open());

        session.close();
        session.close();
        assert!(!session.is_open());
        assert_eq!(registry.depth(), 0);
        drop(session);
        assert_eq!(registry.depth(), 0);
    }

    #[test]
    fn drop_closes() {
        let registry = bare();
        {
            let _session = registry.open_session();
            assert_eq!(registry.depth(), 1);
        }
        assert_eq!(registry.depth(), 0);
    }

    #[test]
    fn same_thread_nesting() {
        let registry = bare();
        let outer = registry.open_session();
        let inner = registry.open_session();
        assert_eq!(registry.depth(), 2);
        drop(inner);
        assert_eq!(registry.depth(), 1);
        drop(outer);
        assert_eq!(registry.depth(), 0);
    }

    #[test]
    fn out_of_order_close_drops_inner_layer() {
        let registry = bare();
        let mut outer = registry.open_session();
        let mut inner = registry.open_session();
        outer.close();
        assert_eq!(registry.depth(), 0);
        inner.close();
        assert_eq!(registry.depth(), 0);
    }

    #[test]
    fn unlock_keeps_layer_until_close() {
        let registry = bare();
        let mut session = registry.open_session();
        registry.register_implementation::<dyn Tone>(|| Box::new(Hz(440)));
        session.unlock();
        assert!(!session.holds_lock());
        assert!(session.is_open());

        let seen = AtomicBool::new(false);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                let tone = registry.resolve::<dyn Tone>().expect("layer still attached");
                seen.store(tone.pitch() == 440, Ordering::SeqCst);
            });
        });
        assert!(seen.load(Ordering::SeqCst));

        session.close();
        assert!(registry.resolve::<dyn Tone>().is_err());
    }

    #[test]
    fn locked_session_blocks_other_sessions() {
        let registry = bare();
        let opened = AtomicBool::new(false);

        let mut session = registry.open_session();
        std::thread::scope(|scope| {
            let worker = scope.spawn(|| {
                let _other = registry.open_session();
                opened.store(true, Ordering::SeqCst);
            });
            std::thread::sleep(Duration::from_millis(50));
            assert!(!opened.load(Ordering::SeqCst));
            session.close();
            worker.join().unwrap();
        });
        assert!(opened.load(Ordering::SeqCst));
        assert_eq!(registry.depth(), 0);
    }

    #[test]
    fn detached_captures_may_resolve_while_dropping() {
        static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry::with_settings(Settings::bare()));
        static RESOLVED_ON_DROP: AtomicBool = AtomicBool::new(false);

        struct Echo;
        impl Drop for Echo {
            fn drop(&mut self) {
                let resolved = REGISTRY.resolve::<dyn Tone>().is_ok();
                RESOLVED_ON_DROP.store(resolved, Ordering::SeqCst);
            }
        }

        REGISTRY.register_implementation::<dyn Tone>(|| Box::new(Hz(220)));
        {
            let _session = REGISTRY.open_session();
            let echo = Echo;
            REGISTRY.register_tagged_implementation::<dyn Tone>("echo", move || {
                let _held = &echo;
                Box::new(Hz(0))
            });
        }

        assert!(RESOLVED_ON_DROP.load(Ordering::SeqCst));
        assert_eq!(REGISTRY.depth(), 0);
    }

    #[test]
    fn debug_reports_state() {
        let registry = bare();
        let session = registry.open_session();
        let debug = format!("{session:?}");
        assert!(debug.contains("holds_lock: true"));
    }
}
