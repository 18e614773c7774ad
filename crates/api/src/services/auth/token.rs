//! HS256 bearer tokens.
//!
//! Every login or registration yields an access token (24 h) and a refresh
//! token (7 days). Both carry the same claims; `token_type` keeps a refresh
//! token from authenticating ordinary requests.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storekeep_core::{Role, UserId};

use super::AuthError;
use crate::config::AuthConfig;
use crate::models::User;

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims embedded in both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub role: Role,
    pub token_type: TokenType,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign(
    user: &User,
    token_type: TokenType,
    ttl_secs: i64,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user_id: user.id,
        role: user.role,
        token_type,
        iat: now,
        exp: now + ttl_secs,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(AuthError::TokenSigning)
}

/// Issue an access and a refresh token for `user`.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if either token cannot be signed.
pub fn issue_tokens(user: &User, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: sign(user, TokenType::Access, config.access_token_ttl_secs, config)?,
        refresh_token: sign(user, TokenType::Refresh, config.refresh_token_ttl_secs, config)?,
    })
}

/// Verify signature, algorithm, and expiry, and return the claims.
///
/// An optional `Bearer ` prefix is stripped first.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for any verification failure.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    let key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "iat"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })
}

/// Resolve a bearer credential to the user id it names.
///
/// Only access tokens are accepted.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the token fails verification or is
/// a refresh token.
pub fn resolve_identity(bearer: &str, config: &AuthConfig) -> Result<UserId, AuthError> {
    let claims = decode_token(bearer, config)?;
    if claims.token_type != TokenType::Access {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims.user_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use storekeep_core::Email;

    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(7),
            email: Email::parse("a@b.com").unwrap(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            role: Role::Admin,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn config(secret: &str) -> AuthConfig {
        AuthConfig::new(SecretString::from(secret), SecretString::from("admin"))
    }

    #[test]
    fn test_access_token_resolves_with_or_without_prefix() {
        let config = config("k3y-for-tests");
        let pair = issue_tokens(&user(), &config).unwrap();

        assert_eq!(resolve_identity(&pair.access_token, &config).unwrap(), UserId::new(7));
        let bearer = format!("Bearer {}", pair.access_token);
        assert_eq!(resolve_identity(&bearer, &config).unwrap(), UserId::new(7));
    }

    #[test]
    fn test_claims_carry_role_and_lifetimes() {
        let config = config("k3y-for-tests");
        let pair = issue_tokens(&user(), &config).unwrap();

        let access = decode_token(&pair.access_token, &config).unwrap();
        assert_eq!(access.role, Role::Admin);
        assert_eq!(access.exp - access.iat, 86_400);

        let refresh = decode_token(&pair.refresh_token, &config).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 604_800);
    }

    #[test]
    fn test_refresh_token_is_not_a_bearer_credential() {
        let config = config("k3y-for-tests");
        let pair = issue_tokens(&user(), &config).unwrap();
        assert!(matches!(
            resolve_identity(&pair.refresh_token, &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_and_garbage_rejected() {
        let pair = issue_tokens(&user(), &config("one")).unwrap();
        assert!(resolve_identity(&pair.access_token, &config("two")).is_err());
        assert!(resolve_identity("not.a.jwt", &config("one")).is_err());
        assert!(resolve_identity("", &config("one")).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = config("k3y-for-tests");
        config.access_token_ttl_secs = -3600;
        let pair = issue_tokens(&user(), &config).unwrap();
        assert!(resolve_identity(&pair.access_token, &config).is_err());
    }
}
