//! Order writes against a real `PostgreSQL` database.
//!
//! Set `STOREKEEP_DATABASE_URL` (or `DATABASE_URL`) and run with
//! `cargo test -p storekeep-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::PgPool;
use storekeep_api::config::get_database_url;
use storekeep_api::db::{PgStore, Store, create_pool};
use storekeep_api::models::{
    NewAddress, NewOrder, NewOrderItem, NewProduct, NewUser, OrderItemRequest, User,
};
use storekeep_api::services::{OrderError, OrderService};
use storekeep_core::{AddressId, Email, ProductId, Role};

async fn store() -> PgStore {
    let url = get_database_url("STOREKEEP_DATABASE_URL").unwrap();
    let pool = create_pool(&url).await.unwrap();
    sqlx::migrate!("../api/migrations").run(&pool).await.unwrap();
    PgStore::new(pool)
}

async fn customer(store: &PgStore) -> User {
    let email = format!("pg-{}@example.com", uuid::Uuid::new_v4().simple());
    store
        .create_user(NewUser {
            email: Email::parse(&email).unwrap(),
            first_name: "Pat".to_owned(),
            last_name: "Gres".to_owned(),
            password_hash: "not-a-real-hash".to_owned(),
            role: Role::Customer,
        })
        .await
        .unwrap()
}

async fn address(store: &PgStore, user: &User) -> AddressId {
    store
        .create_address(NewAddress {
            user_id: user.id,
            first_name: "Pat".to_owned(),
            last_name: "Gres".to_owned(),
            city: "Lisbon".to_owned(),
            country: "PT".to_owned(),
            zip_code: "1000-001".to_owned(),
            street_address: "Rua Augusta 1".to_owned(),
        })
        .await
        .unwrap()
        .id
}

async fn product(store: &PgStore, price: &str) -> ProductId {
    store
        .create_product(NewProduct {
            name: "Kettle".to_owned(),
            category: "Kitchen".to_owned(),
            description: "Gooseneck".to_owned(),
            price: Decimal::from_str(price).unwrap(),
            stock: 4,
        })
        .await
        .unwrap()
        .id
}

async fn order_rows(pool: &PgPool, user: &User) -> (i64, i64) {
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.id.as_i32())
        .fetch_one(pool)
        .await
        .unwrap();
    let items: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM order_items i
        JOIN orders o ON o.id = i.order_id
        WHERE o.user_id = $1
        ",
    )
    .bind(user.id.as_i32())
    .fetch_one(pool)
    .await
    .unwrap();
    (orders, items)
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_create_order_persists_header_and_items() {
    let store = store().await;
    let user = customer(&store).await;
    let address_id = address(&store, &user).await;
    let kettle = product(&store, "39.90").await;

    let order = store
        .create_order(NewOrder {
            user_id: user.id,
            address_id,
            total: Decimal::from_str("79.80").unwrap(),
            items: vec![NewOrderItem {
                product_id: kettle,
                price: Decimal::from_str("79.80").unwrap(),
                quantity: 2,
            }],
        })
        .await
        .unwrap();

    let details = store.order_details(order.id).await.unwrap().unwrap();
    assert_eq!(details.total, Decimal::from_str("79.80").unwrap());
    assert_eq!(details.order_items.len(), 1);
    assert_eq!(details.order_items[0].product_id, kettle);
    assert_eq!(details.order_items[0].quantity, 2);
    assert_eq!(order_rows(store.pool(), &user).await, (1, 1));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_failing_item_insert_rolls_back_the_order() {
    let store = store().await;
    let user = customer(&store).await;
    let address_id = address(&store, &user).await;
    let kettle = product(&store, "10.00").await;
    let price = Decimal::from_str("10.00").unwrap();

    let result = store
        .create_order(NewOrder {
            user_id: user.id,
            address_id,
            total: price + price,
            items: vec![
                NewOrderItem {
                    product_id: kettle,
                    price,
                    quantity: 1,
                },
                NewOrderItem {
                    product_id: ProductId::new(i32::MAX),
                    price,
                    quantity: 1,
                },
            ],
        })
        .await;

    assert!(result.is_err());
    assert_eq!(order_rows(store.pool(), &user).await, (0, 0));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_place_order_with_unknown_product_writes_nothing() {
    let store = store().await;
    let user = customer(&store).await;
    let address_id = address(&store, &user).await;
    let kettle = product(&store, "12.50").await;
    let lines = [
        OrderItemRequest {
            product_id: Some(kettle),
            quantity: Some(1),
        },
        OrderItemRequest {
            product_id: Some(ProductId::new(i32::MAX)),
            quantity: Some(1),
        },
    ];

    let err = OrderService::new(&store)
        .place_order(&user, address_id, &lines)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InvalidProduct(id) if id == ProductId::new(i32::MAX)));
    assert_eq!(order_rows(store.pool(), &user).await, (0, 0));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_largest_storable_total_round_trips() {
    let store = store().await;
    let user = customer(&store).await;
    let address_id = address(&store, &user).await;
    let half = product(&store, "4999999999.99").await;
    let lines = [OrderItemRequest {
        product_id: Some(half),
        quantity: Some(2),
    }];

    let placed = OrderService::new(&store)
        .place_order(&user, address_id, &lines)
        .await
        .unwrap();

    assert_eq!(placed.total, Decimal::from_str("9999999999.98").unwrap());
    assert_eq!(order_rows(store.pool(), &user).await, (1, 1));
}
