//! Shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use storekeep_core::{AddressId, UserId};

/// A stored address, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub country: String,
    pub zip_code: String,
    pub street_address: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload, already scoped to its owner.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub country: String,
    pub zip_code: String,
    pub street_address: String,
}

/// Body of `POST /v1/addresses`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub last_name: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub city: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub country: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub zip_code: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub street_address: Option<String>,
}

impl CreateAddressRequest {
    /// Attach the validated fields to `owner`.
    #[must_use]
    pub fn for_owner(self, owner: UserId) -> NewAddress {
        NewAddress {
            user_id: owner,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            zip_code: self.zip_code.unwrap_or_default(),
            street_address: self.street_address.unwrap_or_default(),
        }
    }
}
