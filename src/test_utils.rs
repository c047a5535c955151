use crate::*;
use crate::auth::TokenService;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use diesel::RunQueryDsl;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Enables foreign key constraints (through the pool's connection customizer)
/// 3. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Use a unique shared in-memory database for each test.
    // Plain ":memory:" gives each connection its own separate database,
    // so migrations run on one connection wouldn't be visible on others.
    // By using a unique URI with cache=shared, all connections in this pool
    // share the same in-memory database while remaining isolated from other tests.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Token service with a fixed secret and the default lifetimes
pub fn test_tokens() -> TokenService {
    TokenService::new(b"test-secret", Duration::from_secs(15 * 60), Duration::from_secs(30 * 24 * 3600))
}

/// Application state over a fresh test database
pub fn test_state() -> AppState {
    AppState::new(setup_test_db(), test_tokens())
}

use diesel::sql_types::{Integer, Text};
use diesel::QueryableByName;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName, Debug)]
struct PragmaValue {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. The database has the expected tables
/// 3. Foreign keys are enforced on pooled connections
/// 4. The app can serve a request against it
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "stores", "items", "tags", "item_tags", "users",
        "__diesel_schema_migrations" // Diesel's migration tracking table
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    let pragma: Vec<PragmaValue> = diesel::sql_query("PRAGMA foreign_keys")
        .load(&mut conn)
        .unwrap();
    assert_eq!(pragma[0].foreign_keys, 1);

    drop(conn);

    let app = create_app(AppState::new(pool, test_tokens()));
    let request = Request::builder()
        .uri("/store")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Strategy producing valid entity names: non-empty, no surrounding
/// whitespace, within the length limit
pub fn arb_name() -> impl proptest::strategy::Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 _-]{0,30}[A-Za-z0-9]"
}

/// Removes duplicate names, keeping the first occurrence
pub fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names.into_iter().filter(|n| seen.insert(n.clone())).collect()
}

/// Inserts a store, for tests that only need something to hang items on
pub fn seed_store(pool: &db::DbPool, name: &str) -> models::Store {
    repo::create_store(pool, name.to_string()).expect("Failed to create store")
}

/// Inserts an item in the given store
pub fn seed_item(pool: &db::DbPool, store_id: i32, name: &str, price: f64) -> models::Item {
    repo::create_item(pool, models::NewItem::new(name.to_string(), price, store_id, None))
        .expect("Failed to create item")
}
