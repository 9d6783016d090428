//! Core types for UTI dos Games.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::Pricing;
pub use product::{Badge, Product, ProductSummary, ProductTag};
