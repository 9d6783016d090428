//! UTI dos Games Storefront library.
//!
//! Product catalog access for the storefront, fronted by an in-memory
//! product cache with single-flight fetches and TTL expiry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uti_games_storefront::cache::ProductCache;
//! use uti_games_storefront::catalog::SupabaseCatalog;
//! use uti_games_storefront::config::StorefrontConfig;
//!
//! let config = StorefrontConfig::from_env()?;
//! let catalog = SupabaseCatalog::new(&config.supabase, &config.cache)?;
//! let cache = ProductCache::new(Arc::new(catalog), config.cache.clone());
//! let _sweeper = cache.spawn_sweeper();
//!
//! let product = cache.get_product(&"p1".into()).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod catalog;
pub mod config;
