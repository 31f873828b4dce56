use serde::Serialize;
use serde_json::{Value, json};

/// A transcript entry, classified once when the stored transcript is decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatTurn {
    User { content: String },
    Assistant { content: String },
    /// Stored entry without a usable `role`/`content` pair. Kept verbatim so
    /// it survives a write back to storage.
    Malformed { raw: Value },
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        ChatTurn::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatTurn::Assistant {
            content: content.into(),
        }
    }

    /// Classifies one stored entry. Well-formed entries for roles that are never
    /// shown (`system`, `tool`) yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(entry) = value else {
            return Some(ChatTurn::Malformed { raw: value.clone() });
        };

        let (Some(role), Some(content)) = (
            entry.get("role").and_then(Value::as_str),
            entry.get("content").and_then(Value::as_str),
        ) else {
            return Some(ChatTurn::Malformed { raw: value.clone() });
        };

        match role.to_lowercase().as_str() {
            "user" => Some(ChatTurn::user(content)),
            "assistant" => Some(ChatTurn::assistant(content)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ChatTurn::User { content } => json!({ "role": "user", "content": content }),
            ChatTurn::Assistant { content } => json!({ "role": "assistant", "content": content }),
            ChatTurn::Malformed { raw } => raw.clone(),
        }
    }
}

/// Decodes a stored `chat_history` array. Anything that is not an array decodes
/// to a single malformed entry.
pub fn decode_transcript(value: &Value) -> Vec<ChatTurn> {
    match value {
        Value::Array(entries) => entries.iter().filter_map(ChatTurn::from_value).collect(),
        Value::Null => Vec::new(),
        other => vec![ChatTurn::Malformed { raw: other.clone() }],
    }
}

pub fn encode_transcript(turns: &[ChatTurn]) -> Value {
    Value::Array(turns.iter().map(ChatTurn::to_value).collect())
}
