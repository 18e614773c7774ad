//! Persistence gateway.
//!
//! Handlers never touch a connection pool directly. They go through the
//! [`Store`] trait object held by [`AppState`](crate::state::AppState), which
//! has two implementations:
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`, one repository per table group
//! - [`MemoryStore`] - in-process tables for tests and local experiments
//!
//! ## Tables
//!
//! - `users` - Accounts with Argon2 password hashes and a role
//! - `addresses` - Shipping addresses, owned by a user
//! - `products` - Catalog entries
//! - `orders` - Order headers (owner, address, total, status)
//! - `order_items` - Order lines with the subtotal frozen at order time
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p storekeep-cli -- migrate
//! ```

pub mod addresses;
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storekeep_core::{Email, OrderId, OrderStatus, Pagination, ProductId, UserId};

use crate::models::{
    Address, NewAddress, NewOrder, NewProduct, NewUser, Order, OrderDetails, Product,
    ProductPatch, StoredCredentials, User,
};

pub use addresses::AddressRepository;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Row is still referenced by another table.
    #[error("still referenced: {0}")]
    InUse(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Every read and write the HTTP layer performs.
///
/// Lookups return `Ok(None)` for missing rows; errors are reserved for
/// storage failures and constraint violations.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness probe used by `/health/ready`.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // -- users ---------------------------------------------------------------

    /// Insert an account. Duplicate email yields [`RepositoryError::Conflict`].
    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Load a user and their password hash for login.
    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, RepositoryError>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), RepositoryError>;

    // -- addresses -----------------------------------------------------------

    async fn create_address(&self, new: NewAddress) -> Result<Address, RepositoryError>;

    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError>;

    // -- products ------------------------------------------------------------

    /// One page of products ordered by id, plus the total row count.
    async fn list_products(
        &self,
        page: Pagination,
    ) -> Result<(Vec<Product>, i64), RepositoryError>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError>;

    /// Merge `patch` into the stored product. `Ok(None)` if it does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product. Returns `false` if it did not exist and
    /// [`RepositoryError::InUse`] if an order item still references it.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    // -- orders --------------------------------------------------------------

    /// Insert an order and all of its items atomically.
    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError>;

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// An order with its user, address, and items.
    async fn order_details(&self, id: OrderId) -> Result<Option<OrderDetails>, RepositoryError>;

    /// One page of a user's orders (with relations) ordered by id, plus the total count.
    async fn orders_for_user(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<(Vec<OrderDetails>, i64), RepositoryError>;

    /// Overwrite an order's status. `Ok(None)` if the order does not exist.
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// [`Store`] backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        UserRepository::new(&self.pool).create(&new).await
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, RepositoryError> {
        UserRepository::new(&self.pool)
            .get_credentials_by_email(email)
            .await
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        UserRepository::new(&self.pool).update_last_login(id, at).await
    }

    async fn create_address(&self, new: NewAddress) -> Result<Address, RepositoryError> {
        AddressRepository::new(&self.pool).create(&new).await
    }

    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        AddressRepository::new(&self.pool).list_for_user(user_id).await
    }

    async fn list_products(
        &self,
        page: Pagination,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        ProductRepository::new(&self.pool).list(page).await
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).create(&new).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).update(id, &patch).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        ProductRepository::new(&self.pool).delete(id).await
    }

    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        OrderRepository::new(&self.pool).create(&new).await
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get_by_id(id).await
    }

    async fn order_details(&self, id: OrderId) -> Result<Option<OrderDetails>, RepositoryError> {
        OrderRepository::new(&self.pool).get_details(id).await
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<(Vec<OrderDetails>, i64), RepositoryError> {
        OrderRepository::new(&self.pool)
            .list_for_user(user_id, page)
            .await
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).set_status(id, status).await
    }
}
