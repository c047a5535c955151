use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Represents a store
///
/// A store owns the items and tags that reference it. Deleting a store
/// removes everything it owns.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::stores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Store {
    /// Database-assigned identifier
    id: i32,

    /// The store name, unique across all stores
    name: String,
}

/// Insertable form of a store, before the database assigns its id
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::stores)]
pub struct NewStore {
    pub name: String,
}

impl Store {
    /// Creates a store with all fields specified
    ///
    /// Rows loaded from the database come through `Queryable`; this is for
    /// building expected values in tests and responses.
    pub fn new_with_fields(id: i32, name: String) -> Self {
        Self { id, name }
    }

    /// Gets the store's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the store's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }
}

impl NewStore {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}
