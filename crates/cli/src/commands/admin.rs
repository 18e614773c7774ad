//! Admin user management commands.
//!
//! Admins created here skip the `ADMIN_SECRET_KEY` check that guards
//! `POST /v1/register/admin`; shell access to the database is the credential.

use secrecy::{ExposeSecret, SecretString};
use storekeep_api::db::{PgStore, RepositoryError, Store};
use storekeep_api::models::NewUser;
use storekeep_api::services::AuthError;
use storekeep_api::services::auth::password::hash_password;
use storekeep_core::{Email, EmailError, Role, UserId};
use thiserror::Error;

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Name fields cannot be empty")]
    EmptyName,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("User already exists with email: {0}")]
    UserExists(Email),

    #[error("Failed to hash password: {0}")]
    Hash(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: String,
) -> Result<UserId, AdminError> {
    let email = Email::parse(email)?;
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(AdminError::EmptyName);
    }
    let password = SecretString::from(password);
    if password.expose_secret().is_empty() {
        return Err(AdminError::EmptyPassword);
    }

    let store = PgStore::new(super::connect().await?);

    tracing::info!(%email, "Creating admin user");
    let password_hash = hash_password(password.expose_secret().to_owned()).await?;

    let user = store
        .create_user(NewUser {
            email: email.clone(),
            first_name: first_name.trim().to_owned(),
            last_name: last_name.trim().to_owned(),
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(id = %user.id, email = %user.email, "Admin user created");

    Ok(user.id)
}
