//! A typed key/value view over one session.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use cube_cache::keys;
use cube_core::result::AppResult;

use super::store::SessionStore;

/// A single client session.
///
/// Values are stored as JSON under `session:{id}:{key}`. Reading a value
/// slides its expiry forward by the idle timeout.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    store: SessionStore,
}

impl Session {
    pub(crate) fn new(id: String, store: SessionStore) -> Self {
        Self { id, store }
    }

    /// Session identifier carried by the session cookie.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads a value; undecodable entries are dropped and read as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let cache_key = keys::session_entry(&self.id, key);
        let Some(raw) = self.store.cache().get(&cache_key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.store
                    .cache()
                    .expire(&cache_key, self.store.idle_timeout())
                    .await?;
                Ok(Some(value))
            }
            Err(e) => {
                warn!(session_id = %self.id, key, error = %e, "Dropping undecodable session value");
                self.store.cache().delete(&cache_key).await?;
                Ok(None)
            }
        }
    }

    /// Stores a value, replacing any previous one.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.store
            .cache()
            .set(
                &keys::session_entry(&self.id, key),
                &json,
                self.store.idle_timeout(),
            )
            .await?;
        debug!(session_id = %self.id, key, "Session value stored");
        Ok(())
    }

    /// Removes a value. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        self.store
            .cache()
            .delete(&keys::session_entry(&self.id, key))
            .await?;
        debug!(session_id = %self.id, key, "Session value removed");
        Ok(())
    }

    /// Replaces this session with a freshly issued one.
    ///
    /// Every value of the old session is destroyed; the returned session is
    /// empty and carries a new id.
    pub async fn regenerate(&self) -> AppResult<Session> {
        self.store.destroy(&self.id).await?;
        let fresh = self.store.create();
        debug!(old = %self.id, new = %fresh.id, "Session regenerated");
        Ok(fresh)
    }

    /// Whether a value is present.
    pub async fn contains(&self, key: &str) -> AppResult<bool> {
        self.store
            .cache()
            .exists(&keys::session_entry(&self.id, key))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cube_cache::memory::MemoryCacheProvider;
    use cube_core::config::SessionConfig;
    use cube_core::traits::CacheProvider;

    use super::*;

    fn store() -> (Arc<MemoryCacheProvider>, SessionStore) {
        let cache = Arc::new(MemoryCacheProvider::default());
        let store = SessionStore::new(cache.clone(), &SessionConfig::default());
        (cache, store)
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let (_, store) = store();
        let session = store.create();

        session.set("Admin", &vec![1, 2, 3]).await.unwrap();
        assert!(session.contains("Admin").await.unwrap());
        let value: Option<Vec<i32>> = session.get("Admin").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));

        session.remove("Admin").await.unwrap();
        let value: Option<Vec<i32>> = session.get("Admin").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (_, store) = store();
        let a = store.open("a");
        let b = store.open("b");
        a.set("Admin", &"alice").await.unwrap();

        let other: Option<String> = b.get("Admin").await.unwrap();
        assert!(other.is_none());
        let reopened: Option<String> = store.open("a").get("Admin").await.unwrap();
        assert_eq!(reopened.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_undecodable_value_reads_as_absent() {
        let (cache, store) = store();
        let session = store.open("s1");
        cache.set_default("session:s1:Admin", "{not json").await.unwrap();

        let value: Option<Vec<i32>> = session.get("Admin").await.unwrap();
        assert!(value.is_none());
        assert!(!session.contains("Admin").await.unwrap());
    }

    #[tokio::test]
    async fn test_destroy_removes_every_key() {
        let (_, store) = store();
        let session = store.open("s2");
        session.set("Admin", &1).await.unwrap();
        session.set("Cart", &2).await.unwrap();

        assert_eq!(store.destroy("s2").await.unwrap(), 2);
        assert!(!session.contains("Cart").await.unwrap());
    }

    #[tokio::test]
    async fn test_regenerate_issues_new_empty_session() {
        let (_, store) = store();
        let old = store.create();
        old.set("Admin", &"alice").await.unwrap();

        let fresh = old.regenerate().await.unwrap();
        assert_ne!(fresh.id(), old.id());
        assert!(SessionStore::is_issued_id(fresh.id()));
        assert!(!old.contains("Admin").await.unwrap());
        assert!(!fresh.contains("Admin").await.unwrap());
    }

    #[test]
    fn test_issued_id_shape() {
        let (_, store) = store();
        assert!(SessionStore::is_issued_id(store.create().id()));
        assert!(!SessionStore::is_issued_id("attacker-chosen"));
        assert!(!SessionStore::is_issued_id("0123456789ABCDEF0123456789ABCDEF"));
        assert!(!SessionStore::is_issued_id(""));
    }

    #[test]
    fn test_huge_idle_timeout_is_clamped() {
        let cache = Arc::new(MemoryCacheProvider::default());
        let config = SessionConfig {
            idle_timeout_minutes: u64::MAX,
            ..SessionConfig::default()
        };
        let store = SessionStore::new(cache, &config);
        assert_eq!(
            store.idle_timeout(),
            std::time::Duration::from_secs(cube_core::config::MAX_IDLE_TIMEOUT_MINUTES * 60)
        );
    }
}
