//! Per-leader conversation session ids.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::storage::KeyValueStore;

pub fn session_key(leader_id: &str) -> String {
    format!("chat_session_{}", leader_id)
}

/// Derives and persists one session id per leader.
///
/// Storage failures never surface to the caller. When the backing store
/// can't be read or written the id is kept in memory for the life of
/// the process instead.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    fallback: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            fallback: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the stored session id for the leader, creating and
    /// storing a new one if none exists.
    pub async fn get_or_create_session(&self, leader_id: &str) -> String {
        let key = session_key(leader_id);

        let cached = self.fallback.read().unwrap().get(&key).cloned();
        if let Some(id) = cached {
            return id;
        }

        match self.store.get(&key).await {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to read session for leader {}: {:?}", leader_id, e);
            }
        }

        let id = Self::new_session_id();
        tracing::debug!("Created session {} for leader {}", id, leader_id);
        self.save(&key, &id).await;
        id
    }

    /// Replaces the session id for the leader with a new one.
    pub async fn reset_session(&self, leader_id: &str) -> String {
        let key = session_key(leader_id);
        let id = Self::new_session_id();
        tracing::debug!("Reset session for leader {} to {}", leader_id, id);
        self.save(&key, &id).await;
        id
    }

    fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    async fn save(&self, key: &str, id: &str) {
        match self.store.set(key, id).await {
            Ok(()) => {
                // A working store takes over from any earlier fallback
                self.fallback.write().unwrap().remove(key);
            }
            Err(e) => {
                tracing::warn!("Failed to persist session {}, keeping it in memory: {:?}", key, e);
                self.fallback
                    .write()
                    .unwrap()
                    .insert(key.to_string(), id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use anyhow::{Error, Result, anyhow};
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(anyhow!("storage unavailable"))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(anyhow!("storage unavailable"))
        }
    }

    fn is_v4_uuid(id: &str) -> bool {
        Uuid::parse_str(id)
            .map(|u| u.get_version_num() == 4)
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));

        let first = sessions.get_or_create_session("1").await;
        let second = sessions.get_or_create_session("1").await;

        assert_eq!(first, second);
        assert!(is_v4_uuid(&first));
        assert_eq!(first.len(), 36);
    }

    #[tokio::test]
    async fn test_sessions_are_per_leader() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));

        let a = sessions.get_or_create_session("1").await;
        let b = sessions.get_or_create_session("2").await;

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_uses_existing_stored_value() {
        let store = Arc::new(MemoryStore::new());
        store.set("chat_session_5", "existing-id").await.unwrap();
        let sessions = SessionStore::new(store);

        assert_eq!(sessions.get_or_create_session("5").await, "existing-id");
    }

    #[tokio::test]
    async fn test_empty_stored_value_is_replaced() {
        let store = Arc::new(MemoryStore::new());
        store.set("chat_session_5", "").await.unwrap();
        let sessions = SessionStore::new(store.clone());

        let id = sessions.get_or_create_session("5").await;

        assert!(is_v4_uuid(&id));
        assert_eq!(store.get("chat_session_5").await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn test_reset_replaces_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(store.clone());

        let before = sessions.get_or_create_session("1").await;
        let after = sessions.reset_session("1").await;

        assert_ne!(before, after);
        assert_eq!(sessions.get_or_create_session("1").await, after);
        assert_eq!(store.get("chat_session_1").await.unwrap(), Some(after));
    }

    #[tokio::test]
    async fn test_broken_storage_falls_back_to_memory() {
        let sessions = SessionStore::new(Arc::new(BrokenStore));

        let first = sessions.get_or_create_session("1").await;
        let second = sessions.get_or_create_session("1").await;
        assert_eq!(first, second);

        let reset = sessions.reset_session("1").await;
        assert_ne!(reset, first);
        assert_eq!(sessions.get_or_create_session("1").await, reset);
    }
}
