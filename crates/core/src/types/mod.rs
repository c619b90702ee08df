//! Core types for Plateful.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod money;

pub use catalog::{MenuItem, Restaurant};
pub use id::*;
pub use money::Money;
