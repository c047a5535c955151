use crate::db::DbPool;
use crate::dto::StoreDetail;
use crate::models::{Item, NewStore, Store, Tag};
use crate::schema::stores;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Creates a new store in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - The name for the new store
///
/// ### Returns
///
/// A Result containing the newly created Store, with its assigned id
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A store with the same name already exists (UNIQUE constraint)
/// - The database insert operation fails
#[instrument(skip(pool), fields(name = %name))]
pub fn create_store(pool: &DbPool, name: String) -> Result<Store> {
    debug!("Creating new store");

    let conn = &mut pool.get()?;

    let store = diesel::insert_into(stores::table)
        .values(&NewStore::new(name))
        .returning(Store::as_returning())
        .get_result(conn)?;

    info!("Successfully created store with id: {}", store.get_id());

    Ok(store)
}

/// Retrieves a store from the database by its ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `store_id` - The ID of the store to retrieve
///
/// ### Returns
///
/// A Result containing an Option with the Store if found, or None if not found
#[instrument(skip(pool), fields(store_id = %store_id))]
pub fn get_store(pool: &DbPool, store_id: i32) -> Result<Option<Store>> {
    let conn = &mut pool.get()?;

    let result = stores::table
        .find(store_id)
        .select(Store::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}

/// Lists all stores in the database
#[cfg(test)]
#[instrument(skip(pool))]
pub fn list_stores(pool: &DbPool) -> Result<Vec<Store>> {
    let conn = &mut pool.get()?;

    let result = stores::table
        .select(Store::as_select())
        .order(stores::id)
        .load(conn)?;

    info!("Retrieved {} stores", result.len());

    Ok(result)
}

/// Renames a store
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `store_id` - The ID of the store to rename
/// * `name` - The new name
///
/// ### Returns
///
/// A Result containing the updated Store, or None if no store has that id
///
/// ### Errors
///
/// Returns an error if the new name is already taken or the update fails
#[instrument(skip(pool), fields(store_id = %store_id, name = %name))]
pub fn rename_store(pool: &DbPool, store_id: i32, name: String) -> Result<Option<Store>> {
    let conn = &mut pool.get()?;

    let result = diesel::update(stores::table.find(store_id))
        .set(stores::name.eq(name))
        .returning(Store::as_returning())
        .get_result(conn)
        .optional()?;

    Ok(result)
}

/// Deletes a store, along with its items, tags and their links
///
/// ### Returns
///
/// A Result containing `true` if a store was deleted, `false` if none had that id
#[instrument(skip(pool), fields(store_id = %store_id))]
pub fn delete_store(pool: &DbPool, store_id: i32) -> Result<bool> {
    debug!("Deleting store by id");

    let conn = &mut pool.get()?;

    let deleted = diesel::delete(stores::table.find(store_id)).execute(conn)?;

    debug!("Deleted {} store rows", deleted);
    Ok(deleted > 0)
}

/// Retrieves a store together with its items and tags
#[instrument(skip(pool), fields(store_id = %store_id))]
pub fn get_store_detail(pool: &DbPool, store_id: i32) -> Result<Option<StoreDetail>> {
    let conn = &mut pool.get()?;

    let Some(store) = stores::table
        .find(store_id)
        .select(Store::as_select())
        .first(conn)
        .optional()?
    else {
        debug!("Store not found");
        return Ok(None);
    };

    let items = Item::belonging_to(&store)
        .select(Item::as_select())
        .load(conn)?;
    let tags = Tag::belonging_to(&store)
        .select(Tag::as_select())
        .load(conn)?;

    Ok(Some(StoreDetail::new(store, items, tags)))
}

/// Lists all stores together with their items and tags
///
/// Runs three queries regardless of the number of stores.
#[instrument(skip(pool))]
pub fn list_store_details(pool: &DbPool) -> Result<Vec<StoreDetail>> {
    let conn = &mut pool.get()?;

    let all_stores = stores::table
        .select(Store::as_select())
        .order(stores::id)
        .load(conn)?;

    let items = Item::belonging_to(&all_stores)
        .select(Item::as_select())
        .load(conn)?
        .grouped_by(&all_stores);
    let tags = Tag::belonging_to(&all_stores)
        .select(Tag::as_select())
        .load(conn)?
        .grouped_by(&all_stores);

    let details: Vec<StoreDetail> = all_stores
        .into_iter()
        .zip(items)
        .zip(tags)
        .map(|((store, items), tags)| StoreDetail::new(store, items, tags))
        .collect();

    info!("Retrieved {} stores", details.len());

    Ok(details)
}
