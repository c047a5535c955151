use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::Store;

/// Represents an item for sale in a store
///
/// This struct maps directly to the `items` table. Field order follows the
/// table's column order, with `description` last because it was added by a
/// later migration.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Item {
    /// Database-assigned identifier
    id: i32,

    /// The item name
    name: String,

    /// The item price
    price: f64,

    /// The store this item belongs to
    store_id: i32,

    /// Optional free-form description
    description: Option<String>,
}

/// Insertable form of an item, before the database assigns its id
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub store_id: i32,
    pub description: Option<String>,
}

impl Item {
    /// Creates an item with all fields specified
    ///
    /// ### Arguments
    ///
    /// * `id` - The database identifier
    /// * `name` - The item name
    /// * `price` - The item price
    /// * `store_id` - The owning store
    /// * `description` - Optional description
    pub fn new_with_fields(
        id: i32,
        name: String,
        price: f64,
        store_id: i32,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            price,
            store_id,
            description,
        }
    }

    /// Gets the item's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the item's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// Gets the item's price
    pub fn get_price(&self) -> f64 {
        self.price
    }

    /// Gets the ID of the store owning this item
    pub fn get_store_id(&self) -> i32 {
        self.store_id
    }

    /// Gets the item's description, if any
    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }
}

impl NewItem {
    pub fn new(name: String, price: f64, store_id: i32, description: Option<String>) -> Self {
        Self {
            name,
            price,
            store_id,
            description,
        }
    }
}
