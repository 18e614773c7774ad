//! Storekeep Core - Shared domain types.
//!
//! This crate provides the types shared by every Storekeep component:
//! - `api` - HTTP backend (catalog, addresses, orders, auth)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles, order statuses, and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
