//! Stores API: a REST backend for stores, their items and tags, and the
//! users allowed to manage them
//!
//! This library provides the data models, database access, token-based
//! authentication and the web API. The `stores-api` binary wires it to
//! configuration, logging and a TCP listener.
//!
//! ### Modules
//!
//! - `auth`: Token issuance and validation, password hashing, request guards
//! - `blocklist`: In-memory list of revoked tokens
//! - `config`: Layered configuration
//! - `db`: Database connection management
//! - `dto`: Request payloads and response bodies
//! - `errors`: API error type and its HTTP mapping
//! - `handlers`: HTTP handlers
//! - `models`: Data structures representing stores, items, tags and users
//! - `repo`: Repository layer for database operations
//! - `schema`: Database schema definitions
//! - `state`: Shared application state
//!
//! ### Web API
//!
//! - `GET|POST /store`, `GET|PUT|DELETE /store/{store_id}`
//! - `GET|POST /store/{store_id}/tag`
//! - `GET|POST /item`, `GET|PUT|DELETE /item/{item_id}`
//! - `POST|DELETE /item/{item_id}/tag/{tag_id}`
//! - `GET|DELETE /tag/{tag_id}`
//! - `POST /register`, `POST /login`, `POST /logout`, `POST /refresh`
//! - `GET|DELETE /user/{user_id}`

pub mod auth;
pub mod blocklist;
pub mod config;

/// Database connection module
pub mod db;

pub mod dto;
pub mod errors;
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

pub mod state;

#[cfg(test)]
mod test_utils;

use axum::{
    routing::{get, post},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use handlers::*;
use state::AppState;

/// Migrations compiled into the binary
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The shared state: database pool, token service and
///   revocation list
///
/// ### Returns
///
/// An Axum Router configured with all routes and the state
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Stores
        .route("/store", get(list_stores_handler).post(create_store_handler))
        .route(
            "/store/{store_id}",
            get(get_store_handler)
                .put(update_store_handler)
                .delete(delete_store_handler),
        )
        // Tags within a store
        .route("/store/{store_id}/tag", get(list_store_tags_handler).post(create_tag_handler))
        // Items
        .route("/item", get(list_items_handler).post(create_item_handler))
        .route(
            "/item/{item_id}",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        // Linking tags to items
        .route(
            "/item/{item_id}/tag/{tag_id}",
            post(link_tag_to_item_handler).delete(unlink_tag_from_item_handler),
        )
        // Tags
        .route("/tag/{tag_id}", get(get_tag_handler).delete(delete_tag_handler))
        // Users and sessions
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/refresh", post(refresh_handler))
        .route("/user/{user_id}", get(get_user_handler).delete(delete_user_handler))
        .with_state(state)
}

/// Runs the embedded migrations that have not been applied yet
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    for version in applied {
        tracing::info!("Applied migration {}", version);
    }

    Ok(())
}
