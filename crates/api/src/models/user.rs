//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use storekeep_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash lives in [`StoredCredentials`] and never reaches a
/// response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A user together with their password hash, as loaded for login.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Body of `POST /v1/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub last_name: Option<String>,
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
    #[validate(required, length(min = 6))]
    pub password_confirm: Option<String>,
}

/// Body of `POST /v1/register/admin`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAdminRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub last_name: Option<String>,
    #[validate(required, length(min = 6))]
    pub password: Option<String>,
    #[validate(required, length(min = 6))]
    pub password_confirm: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub secret_key: Option<String>,
}

/// Validated registration fields shared by both registration routes.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterRequest {
    /// Unwrap the validated payload.
    ///
    /// Call only after [`Validate::validate`] succeeded; absent fields become
    /// empty strings.
    #[must_use]
    pub fn into_registration(self) -> Registration {
        Registration {
            email: self.email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            password_confirm: self.password_confirm.unwrap_or_default(),
        }
    }
}

impl RegisterAdminRequest {
    /// Split into the registration fields and the presented admin key.
    #[must_use]
    pub fn into_parts(self) -> (Registration, String) {
        let registration = Registration {
            email: self.email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            password_confirm: self.password_confirm.unwrap_or_default(),
        };
        (registration, self.secret_key.unwrap_or_default())
    }
}

/// Body of `POST /v1/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub password: Option<String>,
}

/// Body of `POST /v1/token/refresh`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub refresh_token: Option<String>,
}
