//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed to parse after passing field validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] storekeep_core::EmailError),

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// `password` and `password_confirm` differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Wrong admin registration key.
    #[error("invalid admin secret key")]
    InvalidAdminSecret,

    /// Bearer or refresh token failed verification.
    #[error("invalid token")]
    InvalidToken,

    /// Token verified but its user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Token signing failed.
    #[error("token signing error: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
