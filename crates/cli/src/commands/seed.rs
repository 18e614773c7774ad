//! Seed the catalog with sample products.
//!
//! Useful for exercising pagination and ordering against a fresh database.
//! Running it twice inserts a second copy; product names are not unique.

use rust_decimal::Decimal;
use storekeep_api::db::{PgStore, RepositoryError, Store};
use storekeep_api::models::NewProduct;
use thiserror::Error;
use tracing::info;

use super::ConnectError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to insert product {name}: {source}")]
    Insert {
        name: &'static str,
        source: RepositoryError,
    },
}

/// (name, category, description, price in cents, stock)
const SAMPLE_PRODUCTS: &[(&str, &str, &str, i64, i32)] = &[
    ("Espresso Beans", "coffee", "Dark roast, 1kg bag", 2450, 40),
    ("Filter Beans", "coffee", "Light roast, 500g bag", 1390, 60),
    ("Pour-Over Kettle", "equipment", "Gooseneck, 1L, stainless", 5900, 12),
    ("Burr Grinder", "equipment", "Conical burrs, 40 settings", 12900, 8),
    ("Paper Filters", "supplies", "Pack of 100, size 02", 650, 200),
    ("Ceramic Mug", "merchandise", "350ml, matte black", 1800, 75),
    ("Cold Brew Jar", "equipment", "1.5L glass jar with mesh filter", 3200, 20),
    ("Descaler", "supplies", "Citric-acid based, 4 uses", 990, 90),
    ("Tote Bag", "merchandise", "Organic cotton", 1500, 50),
    ("Decaf Beans", "coffee", "Swiss water process, 500g bag", 1590, 30),
    ("Digital Scale", "equipment", "0.1g resolution with timer", 4500, 15),
    ("Gift Card", "merchandise", "Redeemable online", 2500, 1000),
];

/// Insert every sample product.
///
/// # Errors
///
/// Returns an error on the first product that cannot be inserted.
pub async fn products() -> Result<usize, SeedError> {
    let store = PgStore::new(super::connect().await?);

    for &(name, category, description, cents, stock) in SAMPLE_PRODUCTS {
        let product = store
            .create_product(NewProduct {
                name: name.to_owned(),
                category: category.to_owned(),
                description: description.to_owned(),
                price: Decimal::new(cents, 2),
                stock,
            })
            .await
            .map_err(|source| SeedError::Insert { name, source })?;
        info!(id = %product.id, name, "Inserted product");
    }

    info!(count = SAMPLE_PRODUCTS.len(), "Seeding complete");
    Ok(SAMPLE_PRODUCTS.len())
}
