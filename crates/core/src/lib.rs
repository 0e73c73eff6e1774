//! Shop Insights Core - Shared domain types.
//!
//! This crate provides the types shared by every Shop Insights component:
//! - `server` - Shopify fetcher, mapper, persistence and REST API
//! - `cli` - Command-line tools for migrations, syncs and brand fetches
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. Enable the `postgres` feature to get `sqlx`
//! encode/decode implementations for the IDs and enums.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, shop domains, money and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
