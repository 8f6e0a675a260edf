//! Core registry implementation for beans.

pub mod bean;
pub mod binding;
pub mod defaults;
pub mod error;
pub mod key;
mod node;
pub mod ownership;
pub mod registry;
pub mod session;
pub mod settings;

#[doc(hidden)]
pub use inventory;

pub use bean::Bean;
pub use error::{BeansError, Result, UnresolvedInterface};
pub use key::CapabilityId;
pub use ownership::Ownership;
pub use registry::{
    Registry, configure, prelude, register_implementation, register_instance,
    register_tagged_implementation, register_tagged_instance,
};
pub use session::Session;
pub use settings::Settings;
