//! Loading earlier turns of a conversation for display.
use std::sync::Arc;

use crate::backend::{ApiError, ChatBackend, ChatTurn};

use super::models::DisplayMessage;

#[derive(Clone, Debug, PartialEq)]
pub enum HistoryOutcome {
    Loaded(Vec<DisplayMessage>),
    /// Nothing to show yet. The greeting needs the leader's name,
    /// which the caller doesn't have.
    Deferred,
}

/// Each turn becomes a user message followed by the parsed AI reply.
pub fn turns_to_messages(turns: &[ChatTurn]) -> Vec<DisplayMessage> {
    turns
        .iter()
        .flat_map(|turn| {
            [
                DisplayMessage::user(&turn.user_input),
                DisplayMessage::ai(&turn.ai_response),
            ]
        })
        .collect()
}

fn greeting_or_defer(leader_name: Option<&str>) -> HistoryOutcome {
    match leader_name {
        Some(name) => HistoryOutcome::Loaded(vec![DisplayMessage::greeting(name)]),
        None => HistoryOutcome::Deferred,
    }
}

/// Fetches earlier turns of a conversation and turns them into display
/// messages.
#[derive(Clone)]
pub struct HistoryLoader {
    backend: Arc<dyn ChatBackend>,
}

impl HistoryLoader {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Failures other than authorization are logged and replaced with
    /// the greeting so the conversation view is never left blank.
    pub async fn load(
        &self,
        leader_id: &str,
        leader_name: Option<&str>,
        session_id: &str,
    ) -> Result<HistoryOutcome, ApiError> {
        match self.backend.chat_history(leader_id, session_id).await {
            Ok(turns) if turns.is_empty() => {
                tracing::debug!("No history for leader {} session {}", leader_id, session_id);
                Ok(greeting_or_defer(leader_name))
            }
            Ok(turns) => {
                tracing::debug!(
                    "Loaded {} turns for leader {} session {}",
                    turns.len(),
                    leader_id,
                    session_id
                );
                Ok(HistoryOutcome::Loaded(turns_to_messages(&turns)))
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::error!(
                    "Failed to load chat history for leader {} session {}: {}",
                    leader_id,
                    session_id,
                    e
                );
                Ok(greeting_or_defer(leader_name))
            }
        }
    }
}
