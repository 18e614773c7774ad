//! Authentication service.
//!
//! Password registration and login, token refresh, and bearer resolution.
//! Tokens are described in [`token`]; hashing in [`password`].

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenPair, TokenType};

use chrono::Utc;
use secrecy::ExposeSecret;

use storekeep_core::{Email, Role};

use crate::config::AuthConfig;
use crate::db::{RepositoryError, Store};
use crate::models::{NewUser, Registration, User};

/// A user together with a freshly issued token pair.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub tokens: TokenPair,
}

/// Authentication service.
///
/// Handles registration, login, token refresh, and bearer resolution.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, config: &'a AuthConfig) -> Self {
        Self { store, config }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a customer account and issue tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::InvalidEmail` if the email cannot be normalized.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<Authenticated, AuthError> {
        self.register_with_role(registration, Role::Customer).await
    }

    /// Register an admin account, gated by the shared admin secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidAdminSecret` if `secret_key` is wrong, plus
    /// every error of [`register`](Self::register).
    pub async fn register_admin(
        &self,
        registration: Registration,
        secret_key: &str,
    ) -> Result<Authenticated, AuthError> {
        if secret_key != self.config.admin_secret.expose_secret() {
            tracing::warn!("Admin registration attempted with wrong secret key");
            return Err(AuthError::InvalidAdminSecret);
        }
        self.register_with_role(registration, Role::Admin).await
    }

    async fn register_with_role(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<Authenticated, AuthError> {
        if registration.password != registration.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        let email = Email::parse(&registration.email)?;
        let password_hash = password::hash_password(registration.password).await?;

        let user = self
            .store
            .create_user(NewUser {
                email,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        let tokens = token::issue_tokens(&user, self.config)?;
        Ok(Authenticated { user, tokens })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with email and password.
    ///
    /// A failure to record the login time is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .store
            .credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        password::verify_password(password.to_owned(), credentials.password_hash).await?;

        let mut user = credentials.user;
        let now = Utc::now();
        match self.store.record_login(user.id, now).await {
            Ok(()) => user.last_login = Some(now),
            Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Failed to record login time"),
        }

        let tokens = token::issue_tokens(&user, self.config)?;
        Ok(Authenticated { user, tokens })
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Exchange a refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is invalid, expired, or
    /// an access token, and `AuthError::UserNotFound` if its user is gone.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Authenticated, AuthError> {
        let claims = token::decode_token(refresh_token, self.config)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .store
            .user_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let tokens = token::issue_tokens(&user, self.config)?;
        Ok(Authenticated { user, tokens })
    }

    /// Resolve a bearer credential to a stored user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not verify and
    /// `AuthError::UserNotFound` if the user it names does not exist.
    pub async fn authenticate(&self, bearer: &str) -> Result<User, AuthError> {
        let user_id = token::resolve_identity(bearer, self.config)?;
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn registration(email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            email: email.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            password: password.to_owned(),
            password_confirm: confirm.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let config = AuthConfig::default();
        let auth = AuthService::new(&store, &config);

        let registered = auth
            .register(registration("a@b.com", "secret1", "secret1"))
            .await
            .unwrap();
        assert_eq!(registered.user.role, Role::Customer);
        assert!(!registered.tokens.access_token.is_empty());

        let logged_in = auth.login("A@B.com", "secret1").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
        assert!(logged_in.user.last_login.is_some());

        let stored = store.user_by_id(registered.user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_password_mismatch_and_duplicate() {
        let store = MemoryStore::new();
        let config = AuthConfig::default();
        let auth = AuthService::new(&store, &config);

        assert!(matches!(
            auth.register(registration("a@b.com", "secret1", "secret2")).await,
            Err(AuthError::PasswordMismatch)
        ));

        auth.register(registration("a@b.com", "secret1", "secret1"))
            .await
            .unwrap();
        assert!(matches!(
            auth.register(registration("a@b.com", "secret1", "secret1")).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let config = AuthConfig::default();
        let auth = AuthService::new(&store, &config);
        auth.register(registration("a@b.com", "secret1", "secret1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.login("a@b.com", "wrong!!").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@b.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_admin_registration_requires_secret() {
        let store = MemoryStore::new();
        let config = AuthConfig::default();
        let auth = AuthService::new(&store, &config);

        assert!(matches!(
            auth.register_admin(registration("boss@b.com", "secret1", "secret1"), "nope")
                .await,
            Err(AuthError::InvalidAdminSecret)
        ));

        let admin = auth
            .register_admin(registration("boss@b.com", "secret1", "secret1"), "admin123")
            .await
            .unwrap();
        assert_eq!(admin.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_refresh_and_authenticate() {
        let store = MemoryStore::new();
        let config = AuthConfig::default();
        let auth = AuthService::new(&store, &config);
        let registered = auth
            .register(registration("a@b.com", "secret1", "secret1"))
            .await
            .unwrap();

        let refreshed = auth.refresh(&registered.tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.id, registered.user.id);

        let user = auth
            .authenticate(&refreshed.tokens.access_token)
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "a@b.com");

        assert!(matches!(
            auth.refresh(&registered.tokens.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
