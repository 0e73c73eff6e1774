//! Shop Insights server library.
//!
//! Syncs products, orders and customers from the Shopify Admin GraphQL API,
//! scrapes brand insights from public storefronts, persists both to
//! `PostgreSQL` and serves them through a JSON REST API.
//!
//! # Security
//!
//! Stored Admin API tokens grant read access to store data. They are wrapped
//! in `SecretString` everywhere and never serialized into API responses.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod storefront;
