//! UTI dos Games Core - Shared types library.
//!
//! This crate provides common types used across all UTI dos Games components:
//! - `storefront` - Product catalog access and the product cache
//! - `cli` - Command-line tools for inspecting and warming the cache
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, pricing, full product records and cached summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
