//! Authentication: token issuance and validation, password hashing, and
//! the extractors that guard protected routes.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{ApiError, AuthError};
use crate::state::AppState;

/// Kind of token carried in the `type` claim
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Unique token id, the key for revocation
    pub jti: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp)
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Whether the token came straight from a login
    pub fresh: bool,
}

impl Claims {
    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Seconds a token is still accepted after its `exp`
///
/// The revocation list must hold an entry at least this long past the
/// token's expiry.
pub const TOKEN_LEEWAY_SECS: u64 = 0;

/// Signs and validates tokens with a shared HMAC secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = TOKEN_LEEWAY_SECS;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Builds the service from configuration
    ///
    /// Without a configured secret a random one is generated, which means
    /// tokens do not survive a restart.
    pub fn from_config(config: &Config) -> Self {
        let secret = match &config.jwt_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("No JWT secret configured, generating an ephemeral one");
                rand::random::<[u8; 32]>().to_vec()
            }
        };
        Self::new(&secret, config.access_token_ttl(), config.refresh_token_ttl())
    }

    /// Issues an access token; `fresh` marks tokens obtained from a login
    pub fn issue_access_token(&self, user_id: i32, fresh: bool) -> Result<String, ApiError> {
        self.issue(user_id, TokenKind::Access, fresh, self.access_ttl)
    }

    pub fn issue_refresh_token(&self, user_id: i32) -> Result<String, ApiError> {
        self.issue(user_id, TokenKind::Refresh, false, self.refresh_ttl)
    }

    fn issue(&self, user_id: i32, kind: TokenKind, fresh: bool, ttl: Duration) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            kind,
            fresh,
        };
        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Validates a token's signature and expiry and returns its claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Validates the bearer token of a request against the expected kind and
/// the revocation list
async fn authenticate(parts: &Parts, state: &AppState, kind: TokenKind) -> Result<Claims, AuthError> {
    let token = bearer_token(parts)?;
    let claims = state.tokens().decode(token)?;

    if claims.kind != kind {
        return Err(match kind {
            TokenKind::Access => AuthError::AccessTokenRequired,
            TokenKind::Refresh => AuthError::RefreshTokenRequired,
        });
    }

    if state.blocklist().is_revoked(&claims.jti).await {
        return Err(AuthError::RevokedToken);
    }

    Ok(claims)
}

/// Claims of a valid, unrevoked access token
#[derive(Debug, Clone)]
pub struct AccessClaims(pub Claims);

/// Claims of a valid, unrevoked access token issued directly by a login
#[derive(Debug, Clone)]
pub struct FreshAccessClaims(pub Claims);

/// Claims of a valid, unrevoked refresh token
#[derive(Debug, Clone)]
pub struct RefreshClaims(pub Claims);

impl FromRequestParts<AppState> for AccessClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state, TokenKind::Access).await?))
    }
}

impl FromRequestParts<AppState> for FreshAccessClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, TokenKind::Access).await?;
        if !claims.fresh {
            return Err(AuthError::FreshTokenRequired.into());
        }
        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for RefreshClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state, TokenKind::Refresh).await?))
    }
}
