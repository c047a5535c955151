use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::TOKEN_LEEWAY_SECS;

/// Process-wide set of revoked token ids
///
/// Entries are keyed by the token's `jti` and remember the token's own
/// expiry. An entry is dropped on a later revocation once token validation
/// can no longer accept the token, that is after `exp + TOKEN_LEEWAY_SECS`.
#[derive(Debug, Default)]
pub struct TokenBlocklist {
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenBlocklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes a token
    ///
    /// ### Arguments
    ///
    /// * `jti` - The token id
    /// * `expires_at` - The token's `exp` claim (unix seconds)
    ///
    /// ### Returns
    ///
    /// `true` if the token was not already revoked
    pub async fn revoke(&self, jti: &str, expires_at: i64) -> bool {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;

        let before = revoked.len();
        let leeway = i64::try_from(TOKEN_LEEWAY_SECS).unwrap_or(i64::MAX);
        revoked.retain(|_, exp| exp.saturating_add(leeway) >= now);
        if revoked.len() != before {
            debug!("Pruned {} expired revocations", before - revoked.len());
        }

        revoked.insert(jti.to_string(), expires_at).is_none()
    }

    /// Checks whether a token id has been revoked
    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().await.contains_key(jti)
    }

    /// Number of revocations currently held
    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.revoked.read().await.is_empty()
    }
}
