use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Authentication failures, all reported as 401
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Request does not contain an access token.")]
    MissingToken,
    #[error("Signature verification failed.")]
    InvalidToken,
    #[error("The token has expired.")]
    ExpiredToken,
    #[error("The token has been revoked.")]
    RevokedToken,
    #[error("The token is not fresh.")]
    FreshTokenRequired,
    #[error("Only access tokens are allowed.")]
    AccessTokenRequired,
    #[error("Only refresh tokens are allowed.")]
    RefreshTokenRequired,
    #[error("Invalid credentials.")]
    InvalidCredentials,
}

impl AuthError {
    /// Machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_required",
            AuthError::InvalidToken
            | AuthError::AccessTokenRequired
            | AuthError::RefreshTokenRequired => "invalid_token",
            AuthError::ExpiredToken => "token_expired",
            AuthError::RevokedToken => "token_revoked",
            AuthError::FreshTokenRequired => "fresh_token_required",
            AuthError::InvalidCredentials => "invalid_credentials",
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Tag is not linked to item")]
    NotLinked,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::Database(ref err) => {
                tracing::error!("Database error: {:#}", err);
                serde_json::json!({ "error": format!("{:#}", err) })
            }
            ApiError::Unauthorized(ref err) => serde_json::json!({
                "error": err.to_string(),
                "code": err.code(),
            }),
            ref other => serde_json::json!({ "error": other.to_string() }),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl ApiError {
    /// Gets the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) | ApiError::NotLinked => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Checks whether a repository error was caused by a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}
