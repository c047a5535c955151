use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::db::DbPool;
use crate::dto::{CreateTagDto, MessageResponse, TagAndItemResponse, TagDetail};
use crate::errors::{ApiError, is_unique_violation};
use crate::models::{Item, Tag};
use crate::repo::{self, TagDeletion};

const TAG_STILL_LINKED: &str =
    "Could not delete tag. Make sure that tag is not associated with any items, then try again.";

fn find_item(pool: &DbPool, item_id: i32) -> Result<Item, ApiError> {
    repo::get_item(pool, item_id)?.ok_or(ApiError::NotFound("Item"))
}

fn find_tag(pool: &DbPool, tag_id: i32) -> Result<Tag, ApiError> {
    repo::get_tag(pool, tag_id)?.ok_or(ApiError::NotFound("Tag"))
}

fn find_tag_detail(pool: &DbPool, tag_id: i32) -> Result<TagDetail, ApiError> {
    repo::get_tag_detail(pool, tag_id)?.ok_or(ApiError::NotFound("Tag"))
}

/// Handler for listing the tags of a store
///
/// This function handles GET requests to `/store/{store_id}/tag`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `store_id` - The store ID extracted from the URL path
///
/// ### Returns
///
/// Every tag of the store, each with its store and linked items
#[instrument(skip(pool), fields(store_id = %store_id))]
pub async fn list_store_tags_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the store ID from the URL path
    Path(store_id): Path<i32>,
) -> Result<Json<Vec<TagDetail>>, ApiError> {
    debug!("Listing tags for store");

    let tags = repo::list_tag_details_for_store(&pool, store_id)?
        .ok_or(ApiError::NotFound("Store"))?;

    info!("Retrieved {} tags for store {}", tags.len(), store_id);

    Ok(Json(tags))
}

/// Handler for creating a new tag in a store
///
/// This function handles POST requests to `/store/{store_id}/tag`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `store_id` - The store ID extracted from the URL path
/// * `payload` - The request payload containing the tag name
///
/// ### Returns
///
/// 201 with the newly created tag
#[instrument(skip(pool), fields(store_id = %store_id, name = %payload.name))]
pub async fn create_tag_handler(
    State(pool): State<Arc<DbPool>>,
    Path(store_id): Path<i32>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateTagDto>,
) -> Result<(StatusCode, Json<TagDetail>), ApiError> {
    info!("Creating new tag");

    payload.validate()?;

    let store = repo::get_store(&pool, store_id)?.ok_or(ApiError::NotFound("Store"))?;

    let tag = repo::create_tag(&pool, store_id, payload.name).map_err(|e| {
        if is_unique_violation(&e) {
            debug!("Tag name already used in store");
            ApiError::Conflict("A tag with that name already exists in that store.".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    info!("Successfully created tag with id: {}", tag.get_id());

    Ok((StatusCode::CREATED, Json(TagDetail::new(tag, store, Vec::new()))))
}

/// Handler for getting a tag by ID
///
/// This function handles GET requests to `/tag/{tag_id}`.
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub async fn get_tag_handler(
    State(pool): State<Arc<DbPool>>,
    Path(tag_id): Path<i32>,
) -> Result<Json<TagDetail>, ApiError> {
    debug!("Getting tag");

    Ok(Json(find_tag_detail(&pool, tag_id)?))
}

/// Handler for linking a tag to an item
///
/// This function handles POST requests to `/item/{item_id}/tag/{tag_id}`.
/// Linking a pair that is already linked changes nothing.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `params` - The item ID and tag ID extracted from the URL path
///
/// ### Returns
///
/// 201 with the tag and the items it is now linked to
#[instrument(skip(pool), fields(item_id = %item_id, tag_id = %tag_id))]
pub async fn link_tag_to_item_handler(
    State(pool): State<Arc<DbPool>>,
    // Extract the item ID and tag ID from the URL path
    Path((item_id, tag_id)): Path<(i32, i32)>,
) -> Result<(StatusCode, Json<TagDetail>), ApiError> {
    info!("Linking tag to item");

    let item = find_item(&pool, item_id)?;
    let tag = find_tag(&pool, tag_id)?;

    if item.get_store_id() != tag.get_store_id() {
        warn!(
            "Linking tag of store {} to item of store {}",
            tag.get_store_id(),
            item.get_store_id()
        );
    }

    repo::link_tag_to_item(&pool, item_id, tag_id)?;

    Ok((StatusCode::CREATED, Json(find_tag_detail(&pool, tag_id)?)))
}

/// Handler for unlinking a tag from an item
///
/// This function handles DELETE requests to `/item/{item_id}/tag/{tag_id}`.
///
/// ### Returns
///
/// A confirmation message together with the item and the tag as they are
/// after the unlink
#[instrument(skip(pool), fields(item_id = %item_id, tag_id = %tag_id))]
pub async fn unlink_tag_from_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path((item_id, tag_id)): Path<(i32, i32)>,
) -> Result<Json<TagAndItemResponse>, ApiError> {
    info!("Unlinking tag from item");

    let item = find_item(&pool, item_id)?;
    let tag = find_tag(&pool, tag_id)?;

    if !repo::unlink_tag_from_item(&pool, item_id, tag_id)? {
        return Err(ApiError::NotLinked);
    }

    let message = format!("Tag '{}' unlinked from item '{}'", tag.get_name(), item.get_name());
    info!("{}", message);

    Ok(Json(TagAndItemResponse {
        message,
        item: repo::get_item_detail(&pool, item_id)?.ok_or(ApiError::NotFound("Item"))?,
        tag: find_tag_detail(&pool, tag_id)?,
    }))
}

/// Handler for deleting a tag
///
/// This function handles DELETE requests to `/tag/{tag_id}`. A tag that is
/// still linked to any item is kept and the request fails.
///
/// ### Returns
///
/// 202 with a confirmation message
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub async fn delete_tag_handler(
    State(pool): State<Arc<DbPool>>,
    Path(tag_id): Path<i32>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    info!("Deleting tag");

    match repo::delete_tag_if_unlinked(&pool, tag_id)? {
        TagDeletion::Deleted => {
            info!("Successfully deleted tag {}", tag_id);
            Ok((StatusCode::ACCEPTED, Json(MessageResponse::new("Tag deleted."))))
        }
        TagDeletion::NotFound => Err(ApiError::NotFound("Tag")),
        TagDeletion::StillLinked(count) => {
            debug!("Tag is still linked to {} items", count);
            Err(ApiError::Conflict(TAG_STILL_LINKED.to_string()))
        }
    }
}
