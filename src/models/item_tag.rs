use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Item, Tag};

/// Represents an association between an item and a tag
///
/// The row's existence is the link. The pair `(item_id, tag_id)` is the
/// primary key, so a pair can be linked at most once.
#[derive(Queryable, Selectable, Insertable, Identifiable, Associations, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(belongs_to(Item))]
#[diesel(belongs_to(Tag))]
#[diesel(primary_key(item_id, tag_id))]
#[diesel(table_name = crate::schema::item_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemTag {
    /// The ID of the item
    item_id: i32,

    /// The ID of the tag
    tag_id: i32,
}

impl ItemTag {
    /// Creates a new item tag association
    ///
    /// ### Arguments
    ///
    /// * `item_id` - The ID of the item
    /// * `tag_id` - The ID of the tag
    pub fn new(item_id: i32, tag_id: i32) -> Self {
        Self { item_id, tag_id }
    }

    /// Gets the item ID
    #[cfg(test)]
    pub fn get_item_id(&self) -> i32 {
        self.item_id
    }

    /// Gets the tag ID
    #[cfg(test)]
    pub fn get_tag_id(&self) -> i32 {
        self.tag_id
    }
}
