//! Product Variations Core - Shared types library.
//!
//! This crate provides common types used across all product variation components:
//! - `admin` - Admin JSON API for variation combinations and templates
//! - `cli` - Command-line tools for migrations and template population
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, SKUs, statuses, combination hashes and slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
