//! In-memory session cache using moka
//!
//! Bearer tokens map to sessions that expire after a fixed TTL and after a
//! period of inactivity. Quotes and converted prices are never cached here;
//! they are always derived from the canonical USD price.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Authenticated session handed to handlers that need a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
}

/// Token -> session cache
#[derive(Clone)]
pub struct SessionCache {
    sessions: Cache<String, Arc<Session>>,
}

impl SessionCache {
    /// Create a session cache. Idle sessions expire after a quarter of the TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .time_to_idle(ttl / 4)
                .build(),
        }
    }

    /// Issue a fresh token for a user
    pub async fn issue(&self, user_id: Uuid, email: &str) -> Arc<Session> {
        let session = Arc::new(Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            email: email.to_string(),
        });
        self.sessions
            .insert(session.token.clone(), session.clone())
            .await;
        session
    }

    pub async fn get(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
        info!("Session revoked");
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sessions: self.sessions.entry_count(),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub sessions: u64,
}
