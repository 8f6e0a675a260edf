//! # Beans Support
//!
//! Shared helpers for the beans registry crates.
//!
//! This crate provides:
//! - Text rendering for diagnostics (short type names, layer chains,
//!   "did you mean" suggestions)

pub mod rendering;
