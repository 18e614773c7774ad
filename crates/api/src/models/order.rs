//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use storekeep_core::{AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::{Address, User};

/// An order row without its relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order. `price` is the line subtotal frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order with its owner, address, and items, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub id: OrderId,
    pub user: User,
    /// `None` if the referenced address row is gone.
    pub address: Option<Address>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub order_items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for an order and all of its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub address_id: AddressId,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: i32,
}

/// Body of `POST /v1/orders`.
#[derive(Debug, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate(required)]
    pub address_id: Option<AddressId>,
    #[validate(required, length(min = 1), nested)]
    pub order_items: Option<Vec<OrderItemRequest>>,
}

/// A requested line item.
///
/// Quantity is range-checked by the ordering service so the error can name
/// the product.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    #[validate(required)]
    pub product_id: Option<ProductId>,
    #[validate(required)]
    pub quantity: Option<i32>,
}

/// Body of `PATCH /v1/orders/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub status: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_requires_at_least_one_item() {
        let req: PlaceOrderRequest =
            serde_json::from_str(r#"{"address_id": 1, "order_items": []}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("order_items"));
    }

    #[test]
    fn test_place_order_accepts_zero_quantity_for_service_check() {
        let req: PlaceOrderRequest = serde_json::from_str(
            r#"{"address_id": 1, "order_items": [{"product_id": 5, "quantity": 0}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_item_without_product_id_is_rejected() {
        let req: PlaceOrderRequest =
            serde_json::from_str(r#"{"address_id": 1, "order_items": [{"quantity": 1}]}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }
}
