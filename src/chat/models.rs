//! Display-ready messages derived from chat turns or live exchanges.
use serde::{Deserialize, Serialize};

use super::citations::parse_response;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MessageKind {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "system")]
    System,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct DisplayMessage {
    pub kind: MessageKind,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

impl DisplayMessage {
    pub fn new(kind: MessageKind, text: &str) -> Self {
        DisplayMessage {
            kind,
            text: text.to_string(),
            citations: Vec::new(),
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(MessageKind::User, text)
    }

    /// Builds an AI message from the raw response, splitting off any
    /// citations.
    pub fn ai(raw_response: &str) -> Self {
        let parsed = parse_response(raw_response);
        DisplayMessage {
            kind: MessageKind::Ai,
            text: parsed.main_content,
            citations: parsed.citations,
        }
    }

    pub fn error(text: &str) -> Self {
        Self::new(MessageKind::Error, text)
    }

    pub fn system(text: &str) -> Self {
        Self::new(MessageKind::System, text)
    }

    pub fn greeting(leader_name: &str) -> Self {
        Self::new(MessageKind::Ai, &greeting_text(leader_name))
    }
}

pub fn greeting_text(leader_name: &str) -> String {
    format!("Hello! I'm {}. How can I help you today?", leader_name)
}

/// Notifications published by a `ChatSession` whenever its state
/// changes.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    MessagesChanged(Vec<DisplayMessage>),
    SendingChanged(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&MessageKind::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&MessageKind::Ai).unwrap(), r#""ai""#);
        assert_eq!(serde_json::to_string(&MessageKind::Error).unwrap(), r#""error""#);
        assert_eq!(serde_json::to_string(&MessageKind::System).unwrap(), r#""system""#);
    }

    #[test]
    fn test_ai_message_splits_citations() {
        let msg = DisplayMessage::ai("Veni, vidi, vici.\nCitations:\nPlutarch\nSuetonius");
        assert_eq!(msg.kind, MessageKind::Ai);
        assert_eq!(msg.text, "Veni, vidi, vici.");
        assert_eq!(msg.citations, vec!["Plutarch", "Suetonius"]);
    }

    #[test]
    fn test_user_message_keeps_text() {
        let msg = DisplayMessage::user("  Tell me about Rome\nCitations:\nnone ");
        assert_eq!(msg.text, "  Tell me about Rome\nCitations:\nnone ");
        assert!(msg.citations.is_empty());
    }

    #[test]
    fn test_greeting() {
        let msg = DisplayMessage::greeting("Julius Caesar");
        assert_eq!(msg.kind, MessageKind::Ai);
        assert_eq!(msg.text, "Hello! I'm Julius Caesar. How can I help you today?");
    }
}
