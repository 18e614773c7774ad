//! Core types for Storekeep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pagination;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{PageError, Pagination};
pub use status::*;
