use async_trait::async_trait;

mod client;
mod error;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::{ChatTurn, Leader};

/// The remote operations a chat session depends on. `ApiClient` is the
/// HTTP implementation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_leaders(&self) -> Result<Vec<Leader>, ApiError>;
    async fn get_leader(&self, leader_id: &str) -> Result<Leader, ApiError>;
    async fn chat_history(
        &self,
        leader_id: &str,
        session_id: &str,
    ) -> Result<Vec<ChatTurn>, ApiError>;
    /// Returns the raw response text for the message.
    async fn send_chat(
        &self,
        leader_id: &str,
        session_id: &str,
        message: &str,
    ) -> Result<String, ApiError>;
    async fn clear_chat(&self, leader_id: &str, session_id: &str) -> Result<(), ApiError>;
}
