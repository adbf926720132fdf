//! Wire types for the leaders API.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leader ids arrive as integers from the backend but are only ever
/// used as opaque path segments and storage keys.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Leader {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(i) => i.to_string(),
        RawId::Text(s) => s,
    })
}

/// One request/response pair as stored by the backend.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatTurn {
    pub user_input: String,
    pub ai_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Serialize, Debug)]
pub struct ClearChatRequest<'a> {
    pub session_id: &'a str,
}

/// Error payload returned by the backend on failure, e.g.
/// `{"detail": "Not found."}`
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_accepts_integer_id() {
        let leader: Leader =
            serde_json::from_str(r#"{"id": 7, "name": "Abraham Lincoln"}"#).unwrap();
        assert_eq!(leader.id, "7");
        assert_eq!(leader.name, "Abraham Lincoln");
        assert_eq!(leader.description, None);
        assert_eq!(leader.image, None);
    }

    #[test]
    fn test_leader_accepts_string_id() {
        let leader: Leader = serde_json::from_str(
            r#"{"id": "cleopatra", "name": "Cleopatra", "description": "Queen of Egypt", "image": null}"#,
        )
        .unwrap();
        assert_eq!(leader.id, "cleopatra");
        assert_eq!(leader.description.as_deref(), Some("Queen of Egypt"));
    }

    #[test]
    fn test_chat_turn_timestamp_is_optional() {
        let turns: Vec<ChatTurn> = serde_json::from_str(
            r#"[
                {"user_input": "Hi", "ai_response": "Hello"},
                {"user_input": "Why?", "ai_response": "Because", "created_at": "2024-05-01T12:30:00.123456Z"}
            ]"#,
        )
        .unwrap();
        assert_eq!(turns[0].created_at, None);
        assert!(turns[1].created_at.is_some());
    }

    #[test]
    fn test_chat_turn_requires_both_sides() {
        let result = serde_json::from_str::<ChatTurn>(r#"{"user_input": "Hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest {
            message: "Hello",
            session_id: "abc",
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"message":"Hello","session_id":"abc"}"#
        );
    }

    #[test]
    fn test_chat_reply_rejects_non_string_response() {
        assert!(serde_json::from_str::<ChatReply>(r#"{"response": 42}"#).is_err());
        assert!(serde_json::from_str::<ChatReply>(r#"{"error": "boom"}"#).is_err());
    }
}
