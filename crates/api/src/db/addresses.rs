//! Address repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storekeep_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AddressRow {
    id: i32,
    first_name: String,
    last_name: String,
    city: String,
    country: String,
    zip_code: String,
    street_address: String,
    user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            city: row.city,
            country: row.country,
            zip_code: row.zip_code,
            street_address: row.street_address,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) const ADDRESS_COLUMNS: &str = "id, first_name, last_name, city, country, zip_code, \
                                          street_address, user_id, created_at, updated_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an address for its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown owner, which violates the foreign key).
    pub async fn create(&self, new: &NewAddress) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            INSERT INTO addresses
                (first_name, last_name, city, country, zip_code, street_address, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.city)
        .bind(&new.country)
        .bind(&new.zip_code)
        .bind(&new.street_address)
        .bind(new.user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// All addresses owned by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
