//! Domain models and request payloads.
//!
//! Each submodule pairs the persisted entity (serialized in responses) with
//! the `validator`-annotated payloads accepted by its routes.

pub mod address;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, CreateAddressRequest, NewAddress};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderItemRequest, PlaceOrderRequest,
    UpdateOrderStatusRequest,
};
pub use product::{NewProduct, Product, ProductPatch, ProductRequest, ProductUpdateRequest};
pub use user::{
    LoginRequest, NewUser, RefreshTokenRequest, RegisterAdminRequest, RegisterRequest,
    Registration, StoredCredentials, User,
};
