//! YR Shop Core - Shared domain types.
//!
//! This crate provides the types used across all YR Shop components:
//! - `storefront` - Session-authenticated storefront API
//! - `cli` - Command-line tools for migrations, seeding and admin grants
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Cart accumulation and order pricing live here so they can
//! be exercised without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, the session cart and order pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
