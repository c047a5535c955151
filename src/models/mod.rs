/// Data models module
///
/// This module defines the records stored in the database. Each entity has
/// a `Queryable` struct for rows that already exist and, where the database
/// assigns the id, a `New*` struct for inserts.

mod store;
pub use store::{NewStore, Store};

mod item;
pub use item::{Item, NewItem};

mod tag;
pub use tag::{NewTag, Tag};

mod item_tag;
pub use item_tag::ItemTag;

mod user;
pub use user::{NewUser, User};
