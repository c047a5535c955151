/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for creating, retrieving, updating and deleting
/// stores, items, tags, the links between items and tags, and users.
///
/// Functions take a connection pool, run synchronously, and return
/// `anyhow::Result`. Constraint violations surface as the underlying
/// diesel error, which handlers translate into API errors.

mod store_repo;
mod item_repo;
mod tag_repo;
mod user_repo;

// Re-export all repository functions
pub use store_repo::*;
pub use item_repo::*;
pub use tag_repo::*;
pub use user_repo::*;
