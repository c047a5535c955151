use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::auth::{self, AccessClaims, RefreshClaims};
use crate::db::DbPool;
use crate::dto::{LoginResponse, MessageResponse, RefreshResponse, UserCredentialsDto, UserResponse};
use crate::errors::{ApiError, AuthError, is_unique_violation};
use crate::repo;
use crate::state::AppState;

/// Handler for registering a user
///
/// This function handles POST requests to `/register`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The username and the plain-text password
///
/// ### Returns
///
/// 201 with a confirmation message
#[instrument(skip(pool, payload), fields(username = %payload.username))]
pub async fn register_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<UserCredentialsDto>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    info!("Registering user");

    payload.validate()?;

    let password_hash = auth::hash_password(&payload.password)?;

    repo::create_user(&pool, payload.username, password_hash).map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Duplicate("A user with that username already exists.".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User created successfully."))))
}

/// Handler for logging in
///
/// This function handles POST requests to `/login`.
///
/// ### Returns
///
/// A fresh access token and a refresh token
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<UserCredentialsDto>,
) -> Result<Json<LoginResponse>, ApiError> {
    debug!("Logging in");

    let user = repo::find_user_by_username(state.pool(), &payload.username)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, user.get_password_hash())? {
        debug!("Password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    let tokens = state.tokens();
    let response = LoginResponse {
        access_token: tokens.issue_access_token(user.get_id(), true)?,
        refresh_token: tokens.issue_refresh_token(user.get_id())?,
    };

    info!("User {} logged in", user.get_id());

    Ok(Json(response))
}

/// Handler for logging out
///
/// This function handles POST requests to `/logout`. The presented access
/// token is revoked.
#[instrument(skip(state, claims), fields(user = %claims.sub))]
pub async fn logout_handler(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
) -> Result<Json<MessageResponse>, ApiError> {
    state.blocklist().revoke(&claims.jti, claims.exp).await;

    info!("Revoked access token");

    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// Handler for exchanging a refresh token for a new access token
///
/// This function handles POST requests to `/refresh`. The new access token
/// is never fresh, and the refresh token is revoked so it works only once.
#[instrument(skip(state, claims), fields(user = %claims.sub))]
pub async fn refresh_handler(
    State(state): State<AppState>,
    RefreshClaims(claims): RefreshClaims,
) -> Result<Json<RefreshResponse>, ApiError> {
    let user_id = claims.user_id()?;

    // A concurrent refresh with the same token may have won the race
    if !state.blocklist().revoke(&claims.jti, claims.exp).await {
        return Err(AuthError::RevokedToken.into());
    }

    let access_token = state.tokens().issue_access_token(user_id, false)?;

    info!("Issued refreshed access token");

    Ok(Json(RefreshResponse { access_token }))
}

/// Handler for getting a user by ID
///
/// This function handles GET requests to `/user/{user_id}`.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn get_user_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repo::get_user(&pool, user_id)?.ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user.into()))
}

/// Handler for deleting a user
///
/// This function handles DELETE requests to `/user/{user_id}`.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn delete_user_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete_user(&pool, user_id)? {
        return Err(ApiError::NotFound("User"));
    }

    info!("Deleted user {}", user_id);

    Ok(Json(MessageResponse::new("User deleted.")))
}
