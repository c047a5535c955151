use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::Store;

/// Represents a tag defined by a store
///
/// Tag names are unique within their store. A tag may be linked to any
/// number of items through `ItemTag`.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tag {
    /// Database-assigned identifier
    id: i32,

    /// The name of the tag
    name: String,

    /// The store this tag belongs to
    store_id: i32,
}

/// Insertable form of a tag
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    pub name: String,
    pub store_id: i32,
}

impl Tag {
    /// Creates a tag with all fields specified
    ///
    /// ### Arguments
    ///
    /// * `id` - The database identifier
    /// * `name` - The name of the tag
    /// * `store_id` - The owning store
    pub fn new_with_fields(id: i32, name: String, store_id: i32) -> Self {
        Self { id, name, store_id }
    }

    /// Gets the tag's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the tag's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// Gets the ID of the store owning this tag
    pub fn get_store_id(&self) -> i32 {
        self.store_id
    }
}

impl NewTag {
    pub fn new(name: String, store_id: i32) -> Self {
        Self { name, store_id }
    }
}
