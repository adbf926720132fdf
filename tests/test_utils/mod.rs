//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use mockito::ServerGuard;
use tempfile::TempDir;

use leaderchat::backend::ApiClient;
use leaderchat::chat::{ChatSession, SessionStore};
use leaderchat::core::db::async_db;
use leaderchat::storage::{KeyValueStore, SqliteStore};

pub const LEADER_ID: &str = "1";
pub const LEADER_NAME: &str = "Napoleon Bonaparte";
pub const SESSION_ID: &str = "session-abc";
pub const TOKEN: &str = "test-token";

pub struct TestChat {
    pub server: ServerGuard,
    pub session: ChatSession,
    pub sessions: Arc<SessionStore>,
    pub store: Arc<SqliteStore>,
    // Keeps the db directory alive for the duration of the test
    pub dir: TempDir,
}

/// Creates a chat session for `LEADER_ID` against a mock server with
/// an on-disk session store already holding `SESSION_ID`.
pub async fn test_chat() -> TestChat {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = open_store(&dir).await;
    store
        .set("chat_session_1", SESSION_ID)
        .await
        .expect("Failed to seed session");

    let sessions = Arc::new(SessionStore::new(store.clone()));
    let client = Arc::new(ApiClient::new(
        &server.url(),
        Some(TOKEN),
        Duration::from_secs(5),
    ));
    let session = ChatSession::builder(client, sessions.clone(), LEADER_ID).build();

    TestChat {
        server,
        session,
        sessions,
        store,
        dir,
    }
}

pub async fn open_store(dir: &TempDir) -> Arc<SqliteStore> {
    let db_path = dir.path().join("db");
    let db = async_db(db_path.to_str().unwrap())
        .await
        .expect("Failed to connect to async db");
    Arc::new(SqliteStore::new(&db))
}

pub fn leader_body() -> String {
    serde_json::json!({
        "id": 1,
        "name": LEADER_NAME,
        "description": "Emperor of the French",
        "image": "/media/napoleon.png"
    })
    .to_string()
}
