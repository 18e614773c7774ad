//! In-process [`Store`] used by tests and local experiments.
//!
//! All tables sit behind one mutex, so every trait method is a single
//! critical section. That gives `create_order` the same all-or-nothing
//! behavior as the `PostgreSQL` transaction. Foreign keys, the unique email
//! index, and the product delete restriction are checked the way the
//! schema enforces them.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use storekeep_core::{
    AddressId, Email, OrderId, OrderItemId, OrderStatus, Pagination, ProductId, UserId,
};

use super::{RepositoryError, Store};
use crate::models::{
    Address, NewAddress, NewOrder, NewProduct, NewUser, Order, OrderDetails, OrderItem, Product,
    ProductPatch, StoredCredentials, User,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, StoredCredentials>,
    addresses: BTreeMap<AddressId, Address>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    order_items: BTreeMap<OrderItemId, OrderItem>,
    next_id: i32,
}

impl Tables {
    /// Shared sequence; ids are unique across tables, which is all callers rely on.
    ///
    /// Fails once the `i32` range is used up, like an exhausted `SERIAL`.
    fn next_id(&mut self) -> Result<i32, RepositoryError> {
        self.next_id = self.next_id.checked_add(1).ok_or_else(|| {
            RepositoryError::DataCorruption("memory store id sequence exhausted".to_owned())
        })?;
        Ok(self.next_id)
    }

    fn details(&self, order: &Order) -> Result<OrderDetails, RepositoryError> {
        let user = self
            .users
            .get(&order.user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("order {} has no owner", order.id))
            })?;

        Ok(OrderDetails {
            id: order.id,
            user,
            address: self.addresses.get(&order.address_id).cloned(),
            total: order.total,
            status: order.status,
            order_items: self
                .order_items
                .values()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

/// Mutex-guarded in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of order headers stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn order_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.orders.len())
    }

    /// Number of order items stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn order_item_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.order_items.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("memory store lock poisoned".to_owned()))
    }
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, page: Pagination) -> Vec<T> {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    rows.skip(skip).take(take).collect()
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.lock().map(|_| ())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|c| c.user.email == new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(tables.next_id()?),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            StoredCredentials {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).map(|c| c.user.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|c| &c.user.email == email)
            .cloned())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let creds = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        creds.user.last_login = Some(at);
        creds.user.updated_at = Utc::now();
        Ok(())
    }

    async fn create_address(&self, new: NewAddress) -> Result<Address, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&new.user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user {} does not exist",
                new.user_id
            )));
        }

        let now = Utc::now();
        let address = Address {
            id: AddressId::new(tables.next_id()?),
            first_name: new.first_name,
            last_name: new.last_name,
            city: new.city,
            country: new.country,
            zip_code: new.zip_code,
            street_address: new.street_address,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        Ok(self
            .lock()?
            .addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_products(
        &self,
        page: Pagination,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let tables = self.lock()?;
        let rows = page_of(tables.products.values().cloned(), page);
        Ok((rows, count(tables.products.len())))
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(tables.next_id()?),
            name: new.name,
            category: new.category,
            description: new.description,
            price: new.price,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables.products.get_mut(&id).map(|product| {
            patch.apply_to(product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.order_items.values().any(|item| item.product_id == id) {
            return Err(RepositoryError::InUse(format!(
                "product {id} is part of an order"
            )));
        }
        Ok(tables.products.remove(&id).is_some())
    }

    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&new.user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user {} does not exist",
                new.user_id
            )));
        }
        if let Some(missing) = new
            .items
            .iter()
            .find(|item| !tables.products.contains_key(&item.product_id))
        {
            return Err(RepositoryError::Conflict(format!(
                "product {} does not exist",
                missing.product_id
            )));
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(tables.next_id()?),
            user_id: new.user_id,
            address_id: new.address_id,
            total: new.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let mut lines = Vec::with_capacity(new.items.len());
        for item in new.items {
            lines.push(OrderItem {
                id: OrderItemId::new(tables.next_id()?),
                order_id: order.id,
                product_id: item.product_id,
                price: item.price,
                quantity: item.quantity,
                created_at: now,
                updated_at: now,
            });
        }

        // Nothing is inserted until every id has been allocated
        for line in lines {
            tables.order_items.insert(line.id, line);
        }
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    async fn order_details(&self, id: OrderId) -> Result<Option<OrderDetails>, RepositoryError> {
        let tables = self.lock()?;
        tables
            .orders
            .get(&id)
            .map(|order| tables.details(order))
            .transpose()
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<(Vec<OrderDetails>, i64), RepositoryError> {
        let tables = self.lock()?;
        let owned: Vec<&Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .collect();
        let total = count(owned.len());
        let orders = page_of(owned.into_iter(), page)
            .into_iter()
            .map(|order| tables.details(order))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((orders, total))
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use storekeep_core::Role;

    use super::*;
    use crate::models::NewOrderItem;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            password_hash: "hash".to_owned(),
            role: Role::Customer,
        }
    }

    fn new_product(price: i64) -> NewProduct {
        NewProduct {
            name: "Widget".to_owned(),
            category: "Tools".to_owned(),
            description: "A widget".to_owned(),
            price: Decimal::from(price),
            stock: 5,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.com")).await.unwrap();
        let err = store.create_user(new_user("A@B.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_order_is_all_or_nothing() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();
        let product = store.create_product(new_product(10)).await.unwrap();

        let err = store
            .create_order(NewOrder {
                user_id: user.id,
                address_id: AddressId::new(1),
                total: Decimal::from(30),
                items: vec![
                    NewOrderItem {
                        product_id: product.id,
                        price: Decimal::from(10),
                        quantity: 1,
                    },
                    NewOrderItem {
                        product_id: ProductId::new(999),
                        price: Decimal::from(20),
                        quantity: 1,
                    },
                ],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.order_count().unwrap(), 0);
        assert_eq!(store.order_item_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_id_sequence_fails_cleanly() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();
        let product = store.create_product(new_product(10)).await.unwrap();
        store.lock().unwrap().next_id = i32::MAX - 1;

        let line = || NewOrderItem {
            product_id: product.id,
            price: Decimal::from(10),
            quantity: 1,
        };
        let err = store
            .create_order(NewOrder {
                user_id: user.id,
                address_id: AddressId::new(1),
                total: Decimal::from(20),
                items: vec![line(), line()],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::DataCorruption(_)));
        assert_eq!(store.order_count().unwrap(), 0);
        assert_eq!(store.order_item_count().unwrap(), 0);
        assert!(matches!(
            store.create_user(new_user("c@d.com")).await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();
        let product = store.create_product(new_product(10)).await.unwrap();
        store
            .create_order(NewOrder {
                user_id: user.id,
                address_id: AddressId::new(1),
                total: Decimal::from(10),
                items: vec![NewOrderItem {
                    product_id: product.id,
                    price: Decimal::from(10),
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        let err = store.delete_product(product.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InUse(_)));
        assert!(store.product_by_id(product.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_products_pages_in_id_order() {
        let store = MemoryStore::new();
        for price in 1..=12 {
            store.create_product(new_product(price)).await.unwrap();
        }

        let page = Pagination::new(3, 5).unwrap();
        let (rows, total) = store.list_products(page).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, Decimal::from(11));
    }
}
