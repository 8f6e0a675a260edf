//! # beans: a scoped, tag-aware capability registry for Rust
//!
//! Components ask for a capability (usually a `dyn Trait`) through a
//! [`Bean`] handle instead of constructing their collaborators. Whoever
//! assembles the program decides what each capability resolves to, and
//! tests swap in mocks for the length of an override [`Session`].
//!
//! ```rust
//! use beans::prelude::*;
//!
//! trait Shape: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Circle;
//! impl Shape for Circle {
//!     fn name(&self) -> &'static str { "circle" }
//! }
//!
//! register_implementation::<dyn Shape>(|| Box::new(Circle));
//! let shape: Bean<dyn Shape> = Bean::new().expect("shape bound");
//! assert_eq!(shape.name(), "circle");
//! ```

pub use beans_registry::*;
pub use beans_support::*;
