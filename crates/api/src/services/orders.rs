//! Order placement and the order status lifecycle.
//!
//! # Placement
//!
//! 1. Every requested line is checked in request order: the product must
//!    exist and the quantity must be positive. The first failure aborts the
//!    request before anything is written.
//! 2. Each line is priced at the product's current price times quantity;
//!    the order total is the sum of the lines. Neither may exceed what a
//!    money column stores.
//! 3. The order and all of its items are written by one atomic store call.
//! 4. The stored order is read back with its user, address, and items.
//!
//! The address id is stored as given. Whether it exists or belongs to the
//! caller is not checked; a dangling id reads back as a `null` address.

use rust_decimal::Decimal;
use thiserror::Error;

use storekeep_core::{
    AddressId, InvalidTransition, OrderId, OrderStatus, Pagination, ProductId, UserId,
};

use crate::db::{RepositoryError, Store};
use crate::middleware::policy;
use crate::models::product::max_amount;
use crate::models::{NewOrder, NewOrderItem, OrderDetails, OrderItemRequest, User};

/// Errors produced by [`OrderService`].
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Invalid product ID: {0}")]
    InvalidProduct(ProductId),

    #[error("Quantity must be greater than 0 for product ID: {0}")]
    InvalidQuantity(ProductId),

    #[error("Order amount is too large for product ID: {0}")]
    LineTooLarge(ProductId),

    #[error("Order total exceeds the maximum allowed amount")]
    TotalTooLarge,

    #[error("Order not found")]
    NotFound,

    #[error("Unauthorized, you can only view your own orders")]
    NotViewable,

    #[error("Unauthorized, you can only cancel your own orders")]
    NotOwner,

    #[error("Order cannot be cancelled, it is not in pending state")]
    NotPending(#[source] InvalidTransition),

    #[error("Invalid order status")]
    InvalidStatus(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order workflows on top of a [`Store`].
pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Place an order for `caller`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidProduct` or `OrderError::InvalidQuantity`
    /// for the first bad line, `OrderError::LineTooLarge` or
    /// `OrderError::TotalTooLarge` when an amount exceeds what a money column
    /// holds, and `OrderError::Repository` if the write or the read-back fails.
    pub async fn place_order(
        &self,
        caller: &User,
        address_id: AddressId,
        lines: &[OrderItemRequest],
    ) -> Result<OrderDetails, OrderError> {
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;

        for line in lines {
            let product_id = line.product_id.unwrap_or(ProductId::new(0));
            let product = self
                .store
                .product_by_id(product_id)
                .await?
                .ok_or(OrderError::InvalidProduct(product_id))?;

            let quantity = line.quantity.unwrap_or(0);
            if quantity <= 0 {
                return Err(OrderError::InvalidQuantity(product_id));
            }

            let price = product
                .price
                .checked_mul(Decimal::from(quantity))
                .filter(|price| *price <= max_amount())
                .ok_or(OrderError::LineTooLarge(product_id))?;
            total = total
                .checked_add(price)
                .filter(|total| *total <= max_amount())
                .ok_or(OrderError::TotalTooLarge)?;
            items.push(NewOrderItem {
                product_id,
                price,
                quantity,
            });
        }

        let order = self
            .store
            .create_order(NewOrder {
                user_id: caller.id,
                address_id,
                total,
                items,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %caller.id,
            total = %order.total,
            "Order placed"
        );

        self.details(order.id).await
    }

    /// One page of `owner`'s orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotViewable` unless `caller` is `owner` or an admin.
    pub async fn list_for_user(
        &self,
        caller: &User,
        owner: UserId,
        page: Pagination,
    ) -> Result<(Vec<OrderDetails>, i64), OrderError> {
        if !policy::can_view_orders(caller, owner) {
            return Err(OrderError::NotViewable);
        }
        Ok(self.store.orders_for_user(owner, page).await?)
    }

    /// Cancel a pending order owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, `OrderError::NotOwner` (admins
    /// included), or `OrderError::NotPending`.
    pub async fn cancel(&self, caller: &User, id: OrderId) -> Result<OrderDetails, OrderError> {
        let order = self
            .store
            .order_by_id(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !policy::can_cancel(caller, &order) {
            return Err(OrderError::NotOwner);
        }
        let next = order.status.cancel().map_err(OrderError::NotPending)?;

        self.store
            .set_order_status(id, next)
            .await?
            .ok_or(OrderError::NotFound)?;
        tracing::info!(order_id = %id, user_id = %caller.id, "Order cancelled");

        self.details(id).await
    }

    /// Set an order's status to any known value.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist and
    /// `OrderError::InvalidStatus` if `status` is not a known value.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<OrderDetails, OrderError> {
        self.store
            .order_by_id(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|_| OrderError::InvalidStatus(status.to_owned()))?;

        self.store
            .set_order_status(id, status)
            .await?
            .ok_or(OrderError::NotFound)?;
        tracing::info!(order_id = %id, status = %status, "Order status updated");

        self.details(id).await
    }

    async fn details(&self, id: OrderId) -> Result<OrderDetails, OrderError> {
        self.store
            .order_details(id)
            .await?
            .ok_or(OrderError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use storekeep_core::{Email, Role};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewProduct, NewUser};

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .create_user(NewUser {
                email: Email::parse(email).unwrap(),
                first_name: "F".to_owned(),
                last_name: "L".to_owned(),
                password_hash: "x".to_owned(),
                role,
            })
            .await
            .unwrap()
    }

    async fn seed_product(store: &MemoryStore, price: &str) -> ProductId {
        store
            .create_product(NewProduct {
                name: "Lamp".to_owned(),
                category: "Home".to_owned(),
                description: "Bright".to_owned(),
                price: Decimal::from_str(price).unwrap(),
                stock: 3,
            })
            .await
            .unwrap()
            .id
    }

    fn line(product_id: ProductId, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Some(product_id),
            quantity: Some(quantity),
        }
    }

    #[tokio::test]
    async fn test_total_is_sum_of_line_subtotals() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@b.com", Role::Customer).await;
        let lamp = seed_product(&store, "10.00").await;
        let bulb = seed_product(&store, "2.50").await;

        let order = OrderService::new(&store)
            .place_order(&user, AddressId::new(1), &[line(lamp, 2), line(bulb, 3)])
            .await
            .unwrap();

        assert_eq!(order.total, Decimal::from_str("27.50").unwrap());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.order_items.len(), 2);
        assert_eq!(order.order_items[0].price, Decimal::from(20));
        assert_eq!(order.order_items[1].price, Decimal::from_str("7.50").unwrap());
        assert!(order.address.is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@b.com", Role::Customer).await;
        let lamp = seed_product(&store, "10.00").await;

        let err = OrderService::new(&store)
            .place_order(
                &user,
                AddressId::new(1),
                &[line(lamp, 1), line(ProductId::new(404), 1)],
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid product ID: 404");
        assert_eq!(store.order_count().unwrap(), 0);
        assert_eq!(store.order_item_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected_without_writing() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@b.com", Role::Customer).await;
        let service = OrderService::new(&store);

        // Overflows Decimal itself
        let yacht = seed_product(&store, "100000000000000000000").await;
        let err = service
            .place_order(&user, AddressId::new(1), &[line(yacht, 1_000_000_000)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::LineTooLarge(id) if id == yacht));

        let house = seed_product(&store, "5000000000").await;
        let err = service
            .place_order(&user, AddressId::new(1), &[line(house, 3)])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Order amount is too large for product ID: {house}")
        );

        let err = service
            .place_order(&user, AddressId::new(1), &[line(house, 1), line(house, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::TotalTooLarge));

        assert_eq!(store.order_count().unwrap(), 0);
        assert_eq!(store.order_item_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_names_product() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@b.com", Role::Customer).await;
        let lamp = seed_product(&store, "10.00").await;

        let err = OrderService::new(&store)
            .place_order(&user, AddressId::new(1), &[line(lamp, 0)])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Quantity must be greater than 0 for product ID: {lamp}")
        );
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "a@b.com", Role::Customer).await;
        let other = seed_user(&store, "c@d.com", Role::Customer).await;
        let admin = seed_user(&store, "boss@d.com", Role::Admin).await;
        let lamp = seed_product(&store, "10.00").await;
        let service = OrderService::new(&store);

        let order = service
            .place_order(&owner, AddressId::new(1), &[line(lamp, 1)])
            .await
            .unwrap();

        assert!(matches!(
            service.cancel(&other, order.id).await,
            Err(OrderError::NotOwner)
        ));
        assert!(matches!(
            service.cancel(&admin, order.id).await,
            Err(OrderError::NotOwner)
        ));

        let cancelled = service.cancel(&owner, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        assert!(matches!(
            service.cancel(&owner, order.id).await,
            Err(OrderError::NotPending(_))
        ));
        assert!(matches!(
            service.cancel(&owner, OrderId::new(9999)).await,
            Err(OrderError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_status_accepts_known_values_only() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "a@b.com", Role::Customer).await;
        let lamp = seed_product(&store, "10.00").await;
        let service = OrderService::new(&store);
        let order = service
            .place_order(&owner, AddressId::new(1), &[line(lamp, 1)])
            .await
            .unwrap();

        for status in ["completed", "cancelled", "pending"] {
            let updated = service.update_status(order.id, status).await.unwrap();
            assert_eq!(updated.status.as_str(), status);
        }
        assert!(matches!(
            service.update_status(order.id, "shipped").await,
            Err(OrderError::InvalidStatus(_))
        ));
        assert!(matches!(
            service.update_status(OrderId::new(9999), "completed").await,
            Err(OrderError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_requires_owner_or_admin() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "a@b.com", Role::Customer).await;
        let other = seed_user(&store, "c@d.com", Role::Customer).await;
        let admin = seed_user(&store, "boss@d.com", Role::Admin).await;
        let lamp = seed_product(&store, "10.00").await;
        let service = OrderService::new(&store);
        service
            .place_order(&owner, AddressId::new(1), &[line(lamp, 1)])
            .await
            .unwrap();

        let page = Pagination::default();
        assert_eq!(service.list_for_user(&owner, owner.id, page).await.unwrap().1, 1);
        assert_eq!(service.list_for_user(&admin, owner.id, page).await.unwrap().1, 1);
        assert!(matches!(
            service.list_for_user(&other, owner.id, page).await,
            Err(OrderError::NotViewable)
        ));
    }
}
