//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use storekeep_core::ProductId;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
}

/// Field-wise update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductPatch {
    /// Merge the supplied fields into `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

impl From<NewProduct> for ProductPatch {
    fn from(product: NewProduct) -> Self {
        Self {
            name: Some(product.name),
            category: Some(product.category),
            description: Some(product.description),
            price: Some(product.price),
            stock: Some(product.stock),
        }
    }
}

/// Body of `POST /v1/products` and `PUT /v1/products/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub category: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(required, custom(function = "valid_price"))]
    pub price: Option<Decimal>,
    #[validate(required, range(min = 0))]
    pub stock: Option<i32>,
}

impl ProductRequest {
    /// Unwrap the validated payload.
    #[must_use]
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            stock: self.stock.unwrap_or_default(),
        }
    }
}

/// Body of `PATCH /v1/products/{id}`. Every field is optional.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductUpdateRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, code = "required"))]
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "valid_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
}

impl From<ProductUpdateRequest> for ProductPatch {
    fn from(req: ProductUpdateRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            description: req.description,
            price: req.price,
            stock: req.stock,
        }
    }
}

/// Largest amount a money column (`NUMERIC(12, 2)`) can hold.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || price.is_zero() {
        // `value` is overwritten by the derive with the rejected input
        let mut err = ValidationError::new("gt");
        err.add_param("gt".into(), &0);
        return Err(err);
    }
    if *price > max_amount() {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max_amount().to_string());
        return Err(err);
    }
    Ok(())
}
