use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::db::DbPool;
use crate::dto::{MessageResponse, StoreDetail, StoreDto};
use crate::errors::{ApiError, is_unique_violation};
use crate::repo;

const DUPLICATE_STORE: &str = "A store with that name already exists.";

/// Maps a repository error, turning a name clash into a Conflict
fn store_write_error(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        debug!("Store name already taken");
        ApiError::Conflict(DUPLICATE_STORE.to_string())
    } else {
        ApiError::Database(err)
    }
}

/// Handler for listing all stores
///
/// This function handles GET requests to `/store`.
///
/// ### Returns
///
/// Every store with its items and tags, as JSON
#[instrument(skip(pool))]
pub async fn list_stores_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<StoreDetail>>, ApiError> {
    debug!("Listing all stores");

    let stores = repo::list_store_details(&pool)?;

    info!("Retrieved {} stores", stores.len());

    Ok(Json(stores))
}

/// Handler for creating a new store
///
/// This function handles POST requests to `/store`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The request payload containing the store name
///
/// ### Returns
///
/// 201 with the newly created store
#[instrument(skip(pool), fields(name = %payload.name))]
pub async fn create_store_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<StoreDto>,
) -> Result<(StatusCode, Json<StoreDetail>), ApiError> {
    info!("Creating new store");

    payload.validate()?;

    let store = repo::create_store(&pool, payload.name).map_err(store_write_error)?;

    info!("Successfully created store with id: {}", store.get_id());

    Ok((StatusCode::CREATED, Json(StoreDetail::new(store, Vec::new(), Vec::new()))))
}

/// Handler for getting a store by ID
///
/// This function handles GET requests to `/store/{store_id}`.
#[instrument(skip(pool), fields(store_id = %store_id))]
pub async fn get_store_handler(
    State(pool): State<Arc<DbPool>>,
    Path(store_id): Path<i32>,
) -> Result<Json<StoreDetail>, ApiError> {
    debug!("Getting store");

    let store = repo::get_store_detail(&pool, store_id)?.ok_or(ApiError::NotFound("Store"))?;

    Ok(Json(store))
}

/// Handler for renaming a store
///
/// This function handles PUT requests to `/store/{store_id}`.
///
/// ### Returns
///
/// The renamed store with its items and tags
#[instrument(skip(pool), fields(store_id = %store_id, name = %payload.name))]
pub async fn update_store_handler(
    State(pool): State<Arc<DbPool>>,
    Path(store_id): Path<i32>,
    Json(payload): Json<StoreDto>,
) -> Result<Json<StoreDetail>, ApiError> {
    info!("Renaming store");

    payload.validate()?;

    repo::rename_store(&pool, store_id, payload.name)
        .map_err(store_write_error)?
        .ok_or(ApiError::NotFound("Store"))?;

    let store = repo::get_store_detail(&pool, store_id)?.ok_or(ApiError::NotFound("Store"))?;

    Ok(Json(store))
}

/// Handler for deleting a store
///
/// This function handles DELETE requests to `/store/{store_id}`.
/// The store's items, tags and their links go with it.
#[instrument(skip(pool), fields(store_id = %store_id))]
pub async fn delete_store_handler(
    State(pool): State<Arc<DbPool>>,
    Path(store_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting store");

    if !repo::delete_store(&pool, store_id)? {
        return Err(ApiError::NotFound("Store"));
    }

    info!("Successfully deleted store {}", store_id);

    Ok(Json(MessageResponse::new("Store deleted")))
}
