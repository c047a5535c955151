use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::auth::{AccessClaims, FreshAccessClaims};
use crate::db::DbPool;
use crate::dto::{CreateItemDto, ItemDetail, MessageResponse, UpdateItemDto};
use crate::errors::ApiError;
use crate::models::NewItem;
use crate::repo;

/// Fails with NotFound unless the store exists
fn ensure_store_exists(pool: &DbPool, store_id: i32) -> Result<(), ApiError> {
    match repo::get_store(pool, store_id)? {
        Some(_) => Ok(()),
        None => {
            debug!("Store {} not found", store_id);
            Err(ApiError::NotFound("Store"))
        }
    }
}

fn load_detail(pool: &DbPool, item_id: i32) -> Result<ItemDetail, ApiError> {
    repo::get_item_detail(pool, item_id)?.ok_or(ApiError::NotFound("Item"))
}

/// Handler for listing all items
///
/// This function handles GET requests to `/item`. Requires an access token.
///
/// ### Returns
///
/// Every item with its store and tags, as JSON
#[instrument(skip(pool, claims), fields(user = %claims.0.sub))]
pub async fn list_items_handler(
    State(pool): State<Arc<DbPool>>,
    claims: AccessClaims,
) -> Result<Json<Vec<ItemDetail>>, ApiError> {
    debug!("Listing all items");

    let items = repo::list_item_details(&pool)?;

    info!("Retrieved {} items", items.len());

    Ok(Json(items))
}

/// Handler for creating a new item
///
/// This function handles POST requests to `/item`. Requires a fresh
/// access token.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `claims` - Claims of the caller's fresh access token
/// * `payload` - The request payload containing the item fields
///
/// ### Returns
///
/// 201 with the newly created item, its store and (no) tags
#[instrument(skip(pool, claims, payload), fields(user = %claims.0.sub, store_id = %payload.store_id))]
pub async fn create_item_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Reject the request unless it carries a fresh access token
    claims: FreshAccessClaims,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateItemDto>,
) -> Result<(StatusCode, Json<ItemDetail>), ApiError> {
    info!("Creating new item");

    payload.validate()?;
    ensure_store_exists(&pool, payload.store_id)?;

    let item = repo::create_item(
        &pool,
        NewItem::new(payload.name, payload.price, payload.store_id, payload.description),
    )?;

    info!("Successfully created item with id: {}", item.get_id());

    Ok((StatusCode::CREATED, Json(load_detail(&pool, item.get_id())?)))
}

/// Handler for getting an item by ID
///
/// This function handles GET requests to `/item/{item_id}`. Requires an
/// access token.
#[instrument(skip(pool, claims), fields(item_id = %item_id, user = %claims.0.sub))]
pub async fn get_item_handler(
    State(pool): State<Arc<DbPool>>,
    claims: AccessClaims,
    Path(item_id): Path<i32>,
) -> Result<Json<ItemDetail>, ApiError> {
    debug!("Getting item");

    Ok(Json(load_detail(&pool, item_id)?))
}

/// Handler for updating an item
///
/// This function handles PUT requests to `/item/{item_id}`.
///
/// Fields present in the payload are applied to an existing item. When no
/// item has this id, one is created with it, provided the payload carries
/// a name, a price and a store id.
///
/// ### Returns
///
/// The updated or created item with its store and tags
#[instrument(skip(pool, payload), fields(item_id = %item_id))]
pub async fn update_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateItemDto>,
) -> Result<Json<ItemDetail>, ApiError> {
    info!("Updating item");

    payload.validate()?;
    if let Some(store_id) = payload.store_id {
        ensure_store_exists(&pool, store_id)?;
    }

    if repo::get_item(&pool, item_id)?.is_some() {
        repo::update_item(&pool, item_id, payload)?;
        debug!("Updated existing item");
    } else {
        let Some(create) = payload.into_create() else {
            return Err(ApiError::Validation(
                "name, price and store_id are required to create an item".to_string(),
            ));
        };

        repo::create_item_with_id(
            &pool,
            item_id,
            NewItem::new(create.name, create.price, create.store_id, create.description),
        )?;
        info!("Created item {} from update", item_id);
    }

    Ok(Json(load_detail(&pool, item_id)?))
}

/// Handler for deleting an item
///
/// This function handles DELETE requests to `/item/{item_id}`. Requires an
/// access token.
#[instrument(skip(pool, claims), fields(item_id = %item_id, user = %claims.0.sub))]
pub async fn delete_item_handler(
    State(pool): State<Arc<DbPool>>,
    claims: AccessClaims,
    Path(item_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting item");

    if !repo::delete_item(&pool, item_id)? {
        return Err(ApiError::NotFound("Item"));
    }

    Ok(Json(MessageResponse::new("Item deleted.")))
}
