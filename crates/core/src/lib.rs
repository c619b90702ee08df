//! Plateful Core - Shared types library.
//!
//! This crate provides common types used across all Plateful components:
//! - `cart` - Single-restaurant cart engine (totals, store, error ledger)
//! - `cli` - Command-line tools for replaying cart sessions
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no catalog fetching, no
//! cart state. Catalog data (`MenuItem`, `Restaurant`) is treated as an
//! immutable snapshot supplied by calling code.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and catalog snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
