use crate::db::DbPool;
use crate::dto::TagDetail;
use crate::models::{Item, ItemTag, NewTag, Store, Tag};
use crate::schema::{item_tags, items, stores, tags};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Outcome of a guarded tag deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDeletion {
    Deleted,
    NotFound,
    /// The tag is still linked to this many items and was kept
    StillLinked(i64),
}

/// Creates a new tag in a store
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `store_id` - The store that owns the tag
/// * `name` - The name of the tag
///
/// ### Returns
///
/// A Result containing the newly created Tag if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The store already has a tag with this name (UNIQUE constraint)
/// - The store does not exist (FOREIGN KEY constraint)
#[instrument(skip(pool), fields(store_id = %store_id, name = %name))]
pub fn create_tag(pool: &DbPool, store_id: i32, name: String) -> Result<Tag> {
    debug!("Creating new tag");

    let conn = &mut pool.get()?;

    let tag = diesel::insert_into(tags::table)
        .values(&NewTag::new(name, store_id))
        .returning(Tag::as_returning())
        .get_result(conn)?;

    info!("Successfully created tag with id: {}", tag.get_id());

    Ok(tag)
}

/// Retrieves a tag from the database by its ID
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub fn get_tag(pool: &DbPool, tag_id: i32) -> Result<Option<Tag>> {
    let conn = &mut pool.get()?;

    let result = tags::table
        .find(tag_id)
        .select(Tag::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}

/// Lists the tags of a store
#[cfg(test)]
#[instrument(skip(pool), fields(store_id = %store_id))]
pub fn list_tags_for_store(pool: &DbPool, store_id: i32) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;

    let result = tags::table
        .filter(tags::store_id.eq(store_id))
        .select(Tag::as_select())
        .order(tags::id)
        .load(conn)?;

    debug!("Found {} tags", result.len());
    Ok(result)
}

/// Lists the tags linked to an item
#[cfg(test)]
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn list_tags_for_item(pool: &DbPool, item_id: i32) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;

    let result = item_tags::table
        .inner_join(tags::table)
        .filter(item_tags::item_id.eq(item_id))
        .select(Tag::as_select())
        .order(tags::id)
        .load(conn)?;

    Ok(result)
}

/// Lists the items a tag is linked to
#[cfg(test)]
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub fn list_items_for_tag(pool: &DbPool, tag_id: i32) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;

    let result = item_tags::table
        .inner_join(items::table)
        .filter(item_tags::tag_id.eq(tag_id))
        .select(Item::as_select())
        .order(items::id)
        .load(conn)?;

    Ok(result)
}

fn count_links(conn: &mut SqliteConnection, tag_id: i32) -> QueryResult<i64> {
    item_tags::table
        .filter(item_tags::tag_id.eq(tag_id))
        .count()
        .get_result(conn)
}

/// Counts the items a tag is linked to
#[cfg(test)]
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub fn count_items_for_tag(pool: &DbPool, tag_id: i32) -> Result<i64> {
    let conn = &mut pool.get()?;
    Ok(count_links(conn, tag_id)?)
}

/// Attaches the store and linked items to each tag
fn tag_details(conn: &mut SqliteConnection, store: &Store, store_tags: Vec<Tag>) -> Result<Vec<TagDetail>> {
    let items_per_tag = ItemTag::belonging_to(&store_tags)
        .inner_join(items::table)
        .select((ItemTag::as_select(), Item::as_select()))
        .load::<(ItemTag, Item)>(conn)?
        .grouped_by(&store_tags);

    Ok(store_tags
        .into_iter()
        .zip(items_per_tag)
        .map(|(tag, links)| {
            let items = links.into_iter().map(|(_, item)| item).collect();
            TagDetail::new(tag, store.clone(), items)
        })
        .collect())
}

/// Retrieves a tag together with its store and linked items
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub fn get_tag_detail(pool: &DbPool, tag_id: i32) -> Result<Option<TagDetail>> {
    let conn = &mut pool.get()?;

    let Some((tag, store)) = tags::table
        .inner_join(stores::table)
        .filter(tags::id.eq(tag_id))
        .select((Tag::as_select(), Store::as_select()))
        .first::<(Tag, Store)>(conn)
        .optional()?
    else {
        debug!("Tag not found");
        return Ok(None);
    };

    Ok(tag_details(conn, &store, vec![tag])?.pop())
}

/// Lists the tags of a store, each with its linked items
///
/// ### Returns
///
/// A Result containing None if the store does not exist
#[instrument(skip(pool), fields(store_id = %store_id))]
pub fn list_tag_details_for_store(pool: &DbPool, store_id: i32) -> Result<Option<Vec<TagDetail>>> {
    let conn = &mut pool.get()?;

    let Some(store) = stores::table
        .find(store_id)
        .select(Store::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let store_tags = Tag::belonging_to(&store)
        .select(Tag::as_select())
        .order(tags::id)
        .load(conn)?;

    Ok(Some(tag_details(conn, &store, store_tags)?))
}

/// Links a tag to an item
///
/// Linking an already linked pair leaves the single existing link in place.
///
/// ### Returns
///
/// A Result containing `true` if a new link was created
///
/// ### Errors
///
/// Returns an error if either side does not exist (FOREIGN KEY constraint)
/// or the insert fails
#[instrument(skip(pool), fields(item_id = %item_id, tag_id = %tag_id))]
pub fn link_tag_to_item(pool: &DbPool, item_id: i32, tag_id: i32) -> Result<bool> {
    debug!("Linking tag to item");

    let conn = &mut pool.get()?;

    let inserted = diesel::insert_or_ignore_into(item_tags::table)
        .values(&ItemTag::new(item_id, tag_id))
        .execute(conn)?;

    if inserted == 0 {
        debug!("Tag was already linked to item");
    } else {
        info!("Linked tag {} to item {}", tag_id, item_id);
    }

    Ok(inserted > 0)
}

/// Removes the link between a tag and an item
///
/// ### Returns
///
/// A Result containing `true` if a link existed and was removed
#[instrument(skip(pool), fields(item_id = %item_id, tag_id = %tag_id))]
pub fn unlink_tag_from_item(pool: &DbPool, item_id: i32, tag_id: i32) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(
        item_tags::table
            .filter(item_tags::item_id.eq(item_id))
            .filter(item_tags::tag_id.eq(tag_id)),
    )
    .execute(conn)?;

    debug!("Removed {} links", deleted);
    Ok(deleted > 0)
}

/// Deletes a tag unless it is linked to any item
///
/// The link check and the delete run in one immediate transaction, so a link
/// created concurrently cannot slip in between them.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `tag_id` - The ID of the tag to delete
///
/// ### Returns
///
/// A Result containing the outcome of the deletion
#[instrument(skip(pool), fields(tag_id = %tag_id))]
pub fn delete_tag_if_unlinked(pool: &DbPool, tag_id: i32) -> Result<TagDeletion> {
    let conn = &mut pool.get()?;

    let outcome = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
        let exists = tags::table
            .find(tag_id)
            .select(tags::id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if !exists {
            return Ok(TagDeletion::NotFound);
        }

        let links = count_links(conn, tag_id)?;
        if links > 0 {
            return Ok(TagDeletion::StillLinked(links));
        }

        diesel::delete(tags::table.find(tag_id)).execute(conn)?;
        Ok(TagDeletion::Deleted)
    })?;

    debug!("Tag deletion outcome: {:?}", outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests;
