use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ApiError;
use crate::models::{Item, Store, Tag, User};

/// Longest name accepted for stores, items, tags and usernames
pub const MAX_NAME_LEN: usize = 80;

/// Checks that a name is non-blank and at most `MAX_NAME_LEN` characters
fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} must not be blank", field)));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Data transfer object for creating or renaming a store
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreDto {
    pub name: String,
}

impl StoreDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name("name", &self.name)
    }
}

/// Data transfer object for creating a new item
///
/// This struct is used to deserialize JSON requests for creating items.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateItemDto {
    /// The item name
    pub name: String,

    /// The item price, non-negative
    pub price: f64,

    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// The store the item is created in
    pub store_id: i32,
}

impl CreateItemDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name("name", &self.name)?;
        validate_price(self.price)
    }
}

/// Keeps an explicit `null` apart from a missing field
///
/// Missing fields fall back to `None` through `#[serde(default)]`, while a
/// present field, `null` included, lands in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Data transfer object for updating (or upserting) an item
///
/// Every field is optional when the item already exists. Creating an item
/// through this payload needs `name`, `price` and `store_id`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateItemDto {
    pub name: Option<String>,
    pub price: Option<f64>,
    /// `Some(None)` clears the description, `None` leaves it untouched
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub store_id: Option<i32>,
}

impl UpdateItemDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Converts the payload into a full item when every required field is present
    pub fn into_create(self) -> Option<CreateItemDto> {
        Some(CreateItemDto {
            name: self.name?,
            price: self.price?,
            description: self.description.flatten(),
            store_id: self.store_id?,
        })
    }
}

/// Data transfer object for creating a new tag
///
/// The store comes from the URL path.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTagDto {
    /// The name of the tag
    pub name: String,
}

impl CreateTagDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name("name", &self.name)
    }
}

/// Credentials used by both registration and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserCredentialsDto {
    pub username: String,
    pub password: String,
}

impl UserCredentialsDto {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name("username", &self.username)?;
        if self.password.is_empty() {
            return Err(ApiError::Validation("password must not be empty".to_string()));
        }
        Ok(())
    }
}

/// A store with the items and tags it owns
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreDetail {
    pub id: i32,
    pub name: String,
    pub items: Vec<Item>,
    pub tags: Vec<Tag>,
}

impl StoreDetail {
    pub fn new(store: Store, items: Vec<Item>, tags: Vec<Tag>) -> Self {
        Self {
            id: store.get_id(),
            name: store.get_name(),
            items,
            tags,
        }
    }
}

/// An item with its store and the tags linked to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemDetail {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub store: Store,
    pub tags: Vec<Tag>,
}

impl ItemDetail {
    pub fn new(item: Item, store: Store, tags: Vec<Tag>) -> Self {
        Self {
            id: item.get_id(),
            name: item.get_name(),
            price: item.get_price(),
            description: item.get_description(),
            store,
            tags,
        }
    }
}

/// A tag with its store and the items linked to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TagDetail {
    pub id: i32,
    pub name: String,
    pub store: Store,
    pub items: Vec<Item>,
}

impl TagDetail {
    pub fn new(tag: Tag, store: Store, items: Vec<Item>) -> Self {
        Self {
            id: tag.get_id(),
            name: tag.get_name(),
            store,
            items,
        }
    }
}

/// Confirmation returned after unlinking a tag from an item
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TagAndItemResponse {
    pub message: String,
    pub item: ItemDetail,
    pub tag: TagDetail,
}

/// Public view of a user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.get_id(),
            username: user.get_username(),
        }
    }
}

/// Tokens returned by a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token returned by a refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Generic `{ "message": ... }` body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
