//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::TokenService;
use crate::blocklist::TokenBlocklist;
use crate::db::DbPool;

/// Application state shared across all handlers
///
/// Cheap to clone. Handlers that only touch the database extract
/// `State<Arc<DbPool>>` directly through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pool: Arc<DbPool>,
    tokens: Arc<TokenService>,
    blocklist: Arc<TokenBlocklist>,
}

impl AppState {
    /// Creates the state with an empty revocation list
    pub fn new(pool: Arc<DbPool>, tokens: TokenService) -> Self {
        Self {
            pool,
            tokens: Arc::new(tokens),
            blocklist: Arc::new(TokenBlocklist::new()),
        }
    }

    pub fn pool(&self) -> &Arc<DbPool> {
        &self.pool
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn blocklist(&self) -> &TokenBlocklist {
        &self.blocklist
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("pool", &self.pool.state())
            .finish_non_exhaustive()
    }
}
