//! Session storage over the shared cache provider.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use cube_cache::keys;
use cube_core::config::{MAX_IDLE_TIMEOUT_MINUTES, SessionConfig};
use cube_core::result::AppResult;
use cube_core::traits::cache::CacheProvider;

use super::handle::Session;

/// Opens and destroys sessions; every value expires after the idle timeout.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: Arc<dyn CacheProvider>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Creates a store whose entries live for `idle_timeout_minutes`.
    pub fn new(cache: Arc<dyn CacheProvider>, config: &SessionConfig) -> Self {
        Self {
            cache,
            idle_timeout: Duration::from_secs(
                config.idle_timeout_minutes.clamp(1, MAX_IDLE_TIMEOUT_MINUTES) * 60,
            ),
        }
    }

    /// Handle to an existing (or lazily created) session.
    pub fn open(&self, session_id: impl Into<String>) -> Session {
        Session::new(session_id.into(), self.clone())
    }

    /// Handle to a brand-new session with a random identifier.
    pub fn create(&self) -> Session {
        let id = Uuid::new_v4().simple().to_string();
        debug!(session_id = %id, "Created session");
        self.open(id)
    }

    /// Whether `session_id` has the shape of an id issued by [`create`](Self::create).
    pub fn is_issued_id(session_id: &str) -> bool {
        session_id.len() == 32
            && session_id
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Removes every value stored in a session.
    pub async fn destroy(&self, session_id: &str) -> AppResult<u64> {
        let removed = self
            .cache
            .delete_pattern(&keys::session_pattern(session_id))
            .await?;
        debug!(session_id, removed, "Destroyed session");
        Ok(removed)
    }

    pub(crate) fn cache(&self) -> &dyn CacheProvider {
        self.cache.as_ref()
    }

    pub(crate) fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}
