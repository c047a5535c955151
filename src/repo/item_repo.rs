use std::collections::HashMap;

use crate::db::DbPool;
use crate::dto::{ItemDetail, UpdateItemDto};
use crate::models::{Item, ItemTag, NewItem, Store, Tag};
use crate::schema::{items, stores, tags};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::{Result, anyhow};
use tracing::{instrument, debug, info};

/// Creates a new item in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `new_item` - The item to insert
///
/// ### Returns
///
/// A Result containing the newly created Item if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The referenced store does not exist (FOREIGN KEY constraint)
/// - The database insert operation fails
#[instrument(skip(pool, new_item), fields(store_id = %new_item.store_id, name = %new_item.name))]
pub fn create_item(pool: &DbPool, new_item: NewItem) -> Result<Item> {
    debug!("Creating new item");

    let conn = &mut pool.get()?;

    let item = diesel::insert_into(items::table)
        .values(&new_item)
        .returning(Item::as_returning())
        .get_result(conn)?;

    info!("Successfully created item with id: {}", item.get_id());

    Ok(item)
}

/// Creates an item with a caller-chosen id
///
/// Used when an update targets an id that does not exist yet.
#[instrument(skip(pool, new_item), fields(item_id = %item_id, store_id = %new_item.store_id))]
pub fn create_item_with_id(pool: &DbPool, item_id: i32, new_item: NewItem) -> Result<Item> {
    let conn = &mut pool.get()?;

    let item = diesel::insert_into(items::table)
        .values((
            items::id.eq(item_id),
            items::name.eq(new_item.name),
            items::price.eq(new_item.price),
            items::store_id.eq(new_item.store_id),
            items::description.eq(new_item.description),
        ))
        .returning(Item::as_returning())
        .get_result(conn)?;

    info!("Created item with requested id: {}", item.get_id());

    Ok(item)
}

/// Retrieves an item from the database by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Item if found, or None if not found
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_item(pool: &DbPool, item_id: i32) -> Result<Option<Item>> {
    debug!("Retrieving item by id");

    let conn = &mut pool.get()?;

    let result = items::table
        .find(item_id)
        .select(Item::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("Item not found");
    }

    Ok(result)
}

/// Retrieves all items from the database
#[cfg(test)]
#[instrument(skip(pool))]
pub fn list_items(pool: &DbPool) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;

    let result = items::table
        .select(Item::as_select())
        .order(items::id)
        .load(conn)?;

    info!("Retrieved {} items", result.len());

    Ok(result)
}

/// Updates an item in the database by its ID
///
/// Only the fields present in `changes` are written.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `item_id` - The ID of the item to update
/// * `changes` - The fields to change
///
/// ### Returns
///
/// A Result containing the updated Item, or None if no item has that id
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - `store_id` points at a store that does not exist
/// - The database update operation fails
#[instrument(skip(pool, changes), fields(item_id = %item_id))]
pub fn update_item(pool: &DbPool, item_id: i32, changes: UpdateItemDto) -> Result<Option<Item>> {
    debug!("Updating item by id");

    // Only fields that are Some end up in the UPDATE statement;
    // Some(None) writes NULL
    #[derive(AsChangeset)]
    #[diesel(table_name = items)]
    struct ItemChangeset {
        name: Option<String>,
        price: Option<f64>,
        description: Option<Option<String>>,
        store_id: Option<i32>,
    }

    let changeset = ItemChangeset {
        name: changes.name,
        price: changes.price,
        description: changes.description,
        store_id: changes.store_id,
    };

    // An empty changeset is rejected by diesel; treat it as a plain lookup
    if changeset.name.is_none()
        && changeset.price.is_none()
        && changeset.description.is_none()
        && changeset.store_id.is_none()
    {
        return get_item(pool, item_id);
    }

    let conn = &mut pool.get()?;

    let result = diesel::update(items::table.find(item_id))
        .set(&changeset)
        .returning(Item::as_returning())
        .get_result(conn)
        .optional()?;

    Ok(result)
}

/// Deletes an item and its tag links
///
/// ### Returns
///
/// A Result containing `true` if an item was deleted
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn delete_item(pool: &DbPool, item_id: i32) -> Result<bool> {
    debug!("Deleting item by id");

    let conn = &mut pool.get()?;

    let deleted = diesel::delete(items::table.find(item_id)).execute(conn)?;

    debug!("Deleted {} item rows", deleted);
    Ok(deleted > 0)
}

/// Attaches the store and the linked tags to each item
///
/// Runs two queries regardless of the number of items.
fn item_details(conn: &mut SqliteConnection, all_items: Vec<Item>) -> Result<Vec<ItemDetail>> {
    let store_ids: Vec<i32> = all_items.iter().map(Item::get_store_id).collect();
    let stores_by_id: HashMap<i32, Store> = stores::table
        .filter(stores::id.eq_any(store_ids))
        .select(Store::as_select())
        .load(conn)?
        .into_iter()
        .map(|store| (store.get_id(), store))
        .collect();

    let tags_per_item = ItemTag::belonging_to(&all_items)
        .inner_join(tags::table)
        .select((ItemTag::as_select(), Tag::as_select()))
        .load::<(ItemTag, Tag)>(conn)?
        .grouped_by(&all_items);

    all_items
        .into_iter()
        .zip(tags_per_item)
        .map(|(item, links)| {
            let store = stores_by_id
                .get(&item.get_store_id())
                .cloned()
                .ok_or_else(|| anyhow!("Store {} of item {} is missing", item.get_store_id(), item.get_id()))?;
            let tags = links.into_iter().map(|(_, tag)| tag).collect();
            Ok(ItemDetail::new(item, store, tags))
        })
        .collect()
}

/// Retrieves an item together with its store and tags
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_item_detail(pool: &DbPool, item_id: i32) -> Result<Option<ItemDetail>> {
    let conn = &mut pool.get()?;

    let Some(item) = items::table
        .find(item_id)
        .select(Item::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    Ok(item_details(conn, vec![item])?.pop())
}

/// Lists all items together with their stores and tags
#[instrument(skip(pool))]
pub fn list_item_details(pool: &DbPool) -> Result<Vec<ItemDetail>> {
    let conn = &mut pool.get()?;

    let all_items = items::table
        .select(Item::as_select())
        .order(items::id)
        .load(conn)?;

    let details = item_details(conn, all_items)?;

    info!("Retrieved {} items", details.len());

    Ok(details)
}
