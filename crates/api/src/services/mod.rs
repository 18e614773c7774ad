//! Business logic shared by the route handlers.

pub mod auth;
pub mod orders;

pub use auth::{AuthError, AuthService, Authenticated};
pub use orders::{OrderError, OrderService};
