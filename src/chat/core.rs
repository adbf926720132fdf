//! One conversation with a leader: session id, history, sending and
//! clearing, on top of a `ChatBackend`.
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use super::history::{HistoryLoader, HistoryOutcome};
use super::log::MessageLog;
use super::models::{ChatEvent, DisplayMessage};
use super::session::SessionStore;
use crate::backend::{ApiError, ChatBackend, Leader};
use crate::core::DEFAULT_CLEAR_PROMPT_THRESHOLD;

pub const SEND_FAILED_MESSAGE: &str = "Unknown error occurred";
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear chat history. Please try again.";
pub const LEADER_FAILED_MESSAGE: &str = "Failed to load leader information. Please try again.";

/// The error message shown for a failed send, e.g. `Error: Upstream
/// model unavailable`.
pub fn send_failed_text(err: &ApiError) -> String {
    let reason = err.reason();
    if reason.trim().is_empty() {
        format!("Error: {}", SEND_FAILED_MESSAGE)
    } else {
        format!("Error: {}", reason)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// Waiting on the leader's name before a greeting can be shown
    Deferred,
    /// The session changed while the request was in flight
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The failure was rendered as an error message
    Failed,
    /// Another send is still in flight
    Busy,
    /// Blank input
    Ignored,
    /// The session was cleared before the reply arrived
    Discarded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Failed,
}

/// Clears the `sending` flag if a send is dropped before its reply
/// arrives.
struct SendingGuard<'a> {
    session: &'a ChatSession,
    armed: bool,
}

impl<'a> SendingGuard<'a> {
    fn new(session: &'a ChatSession) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!("Send to leader {} was cancelled", self.session.leader_id);
        if let Ok(mut state) = self.session.state.write() {
            state.sending = false;
        }
        self.session.notify(ChatEvent::SendingChanged(false));
    }
}

struct ChatState {
    session_id: Option<String>,
    log: MessageLog,
    sending: bool,
    history_deferred: bool,
}

/// A conversation with one leader.
///
/// Combines the session store, history loader and message log on top
/// of a `ChatBackend`. Clones share the same state so a handle can be
/// moved into a task while another keeps driving the UI. State is never
/// locked across a request.
///
/// Use `ChatSession::builder()` to construct a `ChatSession`.
#[derive(Clone)]
pub struct ChatSession {
    leader_id: String,
    backend: Arc<dyn ChatBackend>,
    sessions: Arc<SessionStore>,
    history: HistoryLoader,
    state: Arc<RwLock<ChatState>>,
    tx: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatSession {
    pub fn builder(
        backend: Arc<dyn ChatBackend>,
        sessions: Arc<SessionStore>,
        leader_id: &str,
    ) -> ChatSessionBuilder {
        ChatSessionBuilder::new(backend, sessions, leader_id)
    }

    pub fn leader_id(&self) -> &str {
        &self.leader_id
    }

    pub fn leader_name(&self) -> Option<String> {
        self.state.read().unwrap().log.leader_name().map(str::to_string)
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.read().unwrap().session_id.clone()
    }

    pub fn messages(&self) -> Vec<DisplayMessage> {
        self.state.read().unwrap().log.snapshot()
    }

    pub fn is_sending(&self) -> bool {
        self.state.read().unwrap().sending
    }

    pub fn should_prompt_clear(&self) -> bool {
        self.state.read().unwrap().log.should_prompt_clear()
    }

    /// Looks up the leader if needed and loads the conversation.
    pub async fn open(&self) -> Result<LoadOutcome, ApiError> {
        if self.leader_name().is_none() {
            match self.backend.get_leader(&self.leader_id).await {
                Ok(leader) => self.set_leader(&leader),
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to fetch leader {}: {}", self.leader_id, e);
                    let snapshot = {
                        let mut state = self.state.write().unwrap();
                        state.log.append(DisplayMessage::error(LEADER_FAILED_MESSAGE));
                        state.log.snapshot()
                    };
                    self.notify(ChatEvent::MessagesChanged(snapshot));
                }
            }
        }
        self.load_history().await
    }

    pub fn set_leader(&self, leader: &Leader) {
        self.set_leader_name(&leader.name);
    }

    /// Records the leader's name. A greeting that was held back by an
    /// earlier history load is shown now, ahead of anything else in the
    /// log, and the notice about the failed leader lookup is dropped.
    pub fn set_leader_name(&self, name: &str) {
        let snapshot = {
            let mut state = self.state.write().unwrap();
            state.log.set_leader_name(name);
            if state.history_deferred {
                state.history_deferred = false;
                let lookup_failed = DisplayMessage::error(LEADER_FAILED_MESSAGE);
                let mut messages = vec![DisplayMessage::greeting(name)];
                messages.extend(state.log.iter().filter(|m| **m != lookup_failed).cloned());
                state.log.replace(messages);
                Some(state.log.snapshot())
            } else {
                None
            }
        };
        if let Some(messages) = snapshot {
            self.notify(ChatEvent::MessagesChanged(messages));
        }
    }

    /// Returns the current session id, resolving it from the session
    /// store the first time.
    pub async fn ensure_session_id(&self) -> String {
        if let Some(id) = self.session_id() {
            return id;
        }
        let id = self.sessions.get_or_create_session(&self.leader_id).await;
        let mut state = self.state.write().unwrap();
        // Another handle may have resolved it first
        state.session_id.get_or_insert(id).clone()
    }

    /// Replaces the log with the stored conversation. Messages appended
    /// while the request was in flight are kept after the history.
    pub async fn load_history(&self) -> Result<LoadOutcome, ApiError> {
        let session_id = self.ensure_session_id().await;
        let (leader_name, base_len) = {
            let state = self.state.read().unwrap();
            (state.log.leader_name().map(str::to_string), state.log.len())
        };

        let outcome = self
            .history
            .load(&self.leader_id, leader_name.as_deref(), &session_id)
            .await?;

        let (result, snapshot) = {
            let mut state = self.state.write().unwrap();
            if state.session_id.as_deref() != Some(session_id.as_str()) {
                tracing::debug!(
                    "Discarding history for stale session {} of leader {}",
                    session_id,
                    self.leader_id
                );
                return Ok(LoadOutcome::Stale);
            }

            let live: Vec<DisplayMessage> = state.log.iter().skip(base_len).cloned().collect();
            let result = match outcome {
                HistoryOutcome::Loaded(mut messages) => {
                    messages.extend(live);
                    state.log.replace(messages);
                    state.history_deferred = false;
                    LoadOutcome::Applied
                }
                // The name may have arrived while the request was in flight
                HistoryOutcome::Deferred if state.log.leader_name().is_some() => {
                    state.log.clear();
                    state.log.extend(live);
                    state.history_deferred = false;
                    LoadOutcome::Applied
                }
                HistoryOutcome::Deferred => {
                    state.history_deferred = true;
                    LoadOutcome::Deferred
                }
            };
            (result, state.log.snapshot())
        };

        self.notify(ChatEvent::MessagesChanged(snapshot));
        Ok(result)
    }

    /// Sends a message to the leader. Transport and decoding failures
    /// show up as an error message in the log and are never retried.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, ApiError> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let snapshot = {
            let mut state = self.state.write().unwrap();
            if state.sending {
                return Ok(SendOutcome::Busy);
            }
            state.sending = true;
            state.log.append(DisplayMessage::user(text));
            state.log.snapshot()
        };
        let mut guard = SendingGuard::new(self);
        self.notify(ChatEvent::SendingChanged(true));
        self.notify(ChatEvent::MessagesChanged(snapshot));

        let session_id = self.ensure_session_id().await;
        let result = self
            .backend
            .send_chat(&self.leader_id, &session_id, text)
            .await;

        let (outcome, snapshot) = {
            let mut state = self.state.write().unwrap();
            state.sending = false;
            guard.disarm();
            let outcome = if state.session_id.as_deref() != Some(session_id.as_str()) {
                tracing::debug!("Discarding reply for stale session {}", session_id);
                Ok(SendOutcome::Discarded)
            } else {
                match result {
                    Ok(raw) => {
                        state.log.append(DisplayMessage::ai(&raw));
                        Ok(SendOutcome::Delivered)
                    }
                    Err(e) if e.is_unauthorized() => Err(e),
                    Err(e) => {
                        tracing::error!(
                            "Failed to send message to leader {} session {}: {}",
                            self.leader_id,
                            session_id,
                            e
                        );
                        state.log.append(DisplayMessage::error(&send_failed_text(&e)));
                        Ok(SendOutcome::Failed)
                    }
                }
            };
            (outcome, state.log.snapshot())
        };
        self.notify(ChatEvent::SendingChanged(false));
        self.notify(ChatEvent::MessagesChanged(snapshot));

        outcome
    }

    /// Clears the conversation on the backend, then starts a new
    /// session with just the greeting.
    pub async fn clear(&self) -> Result<ClearOutcome, ApiError> {
        let session_id = self.ensure_session_id().await;

        let result = self.backend.clear_chat(&self.leader_id, &session_id).await;
        let outcome = match result {
            Ok(()) => {
                let new_id = self.sessions.reset_session(&self.leader_id).await;
                tracing::info!(
                    "Cleared chat with leader {}, new session {}",
                    self.leader_id,
                    new_id
                );
                let mut state = self.state.write().unwrap();
                state.session_id = Some(new_id);
                state.log.clear();
                state.history_deferred = state.log.is_empty();
                ClearOutcome::Cleared
            }
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                tracing::error!("Failed to clear chat with leader {}: {}", self.leader_id, e);
                let mut state = self.state.write().unwrap();
                state.log.append(DisplayMessage::error(CLEAR_FAILED_MESSAGE));
                ClearOutcome::Failed
            }
        };

        self.notify(ChatEvent::MessagesChanged(self.messages()));
        Ok(outcome)
    }

    fn notify(&self, event: ChatEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is listening
            let _ = tx.send(event);
        }
    }
}

pub struct ChatSessionBuilder {
    leader_id: String,
    backend: Arc<dyn ChatBackend>,
    sessions: Arc<SessionStore>,
    leader_name: Option<String>,
    clear_prompt_threshold: usize,
    tx: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatSessionBuilder {
    pub fn new(backend: Arc<dyn ChatBackend>, sessions: Arc<SessionStore>, leader_id: &str) -> Self {
        Self {
            leader_id: leader_id.to_string(),
            backend,
            sessions,
            leader_name: None,
            clear_prompt_threshold: DEFAULT_CLEAR_PROMPT_THRESHOLD,
            tx: None,
        }
    }

    pub fn build(self) -> ChatSession {
        let log = MessageLog::new(self.leader_name.as_deref(), self.clear_prompt_threshold);
        ChatSession {
            leader_id: self.leader_id,
            history: HistoryLoader::new(self.backend.clone()),
            backend: self.backend,
            sessions: self.sessions,
            state: Arc::new(RwLock::new(ChatState {
                session_id: None,
                log,
                sending: false,
                history_deferred: false,
            })),
            tx: self.tx,
        }
    }

    pub fn leader_name(mut self, name: &str) -> Self {
        self.leader_name = Some(name.to_string());
        self
    }

    pub fn clear_prompt_threshold(mut self, threshold: usize) -> Self {
        self.clear_prompt_threshold = threshold;
        self
    }

    pub fn events(mut self, transmitter: mpsc::UnboundedSender<ChatEvent>) -> Self {
        self.tx = Some(transmitter);
        self
    }
}
