//! Inbound and outbound wire types for the chat gateway.
//!
//! These model one chat turn as seen at the HTTP boundary: the client
//! sends a [`ChatTurnRequest`] (current message plus optional history and
//! routing hints) and receives a [`ChatTurnResponse`] with a single
//! normalized answer string.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Maximum accepted length of an inbound chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("invalid chat role: '{other}'")),
        }
    }
}

impl Default for ChatRole {
    fn default() -> Self {
        ChatRole::User
    }
}

/// One prior turn of a conversation. Order is chronological and
/// semantically significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: ChatRole,
    pub content: String,
}

/// Inbound chat turn as posted to `/api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    /// Current user message. Never empty; capped at [`MAX_MESSAGE_CHARS`].
    pub message: String,
    /// Opaque conversation identifier; generated when absent.
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Prior turns, oldest first. When empty, the gateway may
    /// reconstruct history from the persistence store.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Originating channel tag (web, telegram, ...).
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Caller identity, when the fronting application knows it.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Optional structured profile snapshot forwarded to the model.
    #[serde(default)]
    pub user_profile: Option<serde_json::Value>,
}

fn default_channel() -> String {
    "web".to_string()
}

impl ChatTurnRequest {
    /// Enforce the message invariant: non-empty, at most
    /// [`MAX_MESSAGE_CHARS`] characters.
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            ));
        }
        Ok(())
    }
}

/// Outbound answer for one chat turn.
///
/// `chat_id` is always populated: echoed from the request or freshly
/// generated by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub answer: String,
    pub chat_id: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_roundtrip() {
        for role in [ChatRole::System, ChatRole::User, ChatRole::Assistant] {
            let s = role.to_string();
            let parsed: ChatRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_chat_role_serde() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: ChatRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ChatRole::Assistant);
    }

    #[test]
    fn test_request_minimal_body_defaults() {
        let req: ChatTurnRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert_eq!(req.channel, "web");
        assert!(req.chat_id.is_none());
        assert!(req.history.is_empty());
        assert!(req.user_id.is_none());
        assert!(req.user_profile.is_none());
    }

    #[test]
    fn test_request_history_role_defaults_to_user() {
        let req: ChatTurnRequest = serde_json::from_str(
            r#"{"message":"hi","history":[{"content":"earlier"}]}"#,
        )
        .unwrap();
        assert_eq!(req.history[0].role, ChatRole::User);
    }

    #[test]
    fn test_validate_rejects_empty_message() {
        let req: ChatTurnRequest = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlong_message() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        let req: ChatTurnRequest =
            serde_json::from_value(serde_json::json!({ "message": long })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_boundary_length() {
        let exact = "x".repeat(MAX_MESSAGE_CHARS);
        let req: ChatTurnRequest =
            serde_json::from_value(serde_json::json!({ "message": exact })).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_response_serialize_shape() {
        let resp = ChatTurnResponse {
            answer: "hello back".to_string(),
            chat_id: "abc".to_string(),
            channel: "web".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["answer"], "hello back");
        assert_eq!(json["chat_id"], "abc");
        assert_eq!(json["channel"], "web");
    }
}
