use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::ChatTurn;

/// A persisted conversation thread for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantRun {
    run_id: String,
    user_id: String,
    llm: Option<serde_json::Value>,
    transcript: Vec<ChatTurn>,
    run_data: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AssistantRun {
    pub fn new(user_id: String) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_id)
    }

    pub fn with_id(run_id: String, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            user_id,
            llm: None,
            transcript: Vec::new(),
            run_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_stored(
        run_id: String,
        user_id: String,
        llm: Option<serde_json::Value>,
        transcript: Vec<ChatTurn>,
        run_data: Option<serde_json::Value>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            user_id,
            llm,
            transcript,
            run_data,
            created_at,
            updated_at,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn llm(&self) -> Option<&serde_json::Value> {
        self.llm.as_ref()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn run_data(&self) -> Option<&serde_json::Value> {
        self.run_data.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_llm(&mut self, llm: serde_json::Value) {
        self.llm = Some(llm);
    }

    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.transcript.push(turn);
        self.touch();
    }

    /// The last `num_chats` user/assistant pairs, oldest first.
    pub fn recent_pairs(&self, num_chats: usize) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        let mut pending_question: Option<&str> = None;

        for turn in &self.transcript {
            match turn {
                ChatTurn::User { content } => pending_question = Some(content.as_str()),
                ChatTurn::Assistant { content } => {
                    if let Some(question) = pending_question.take() {
                        pairs.push((question, content.as_str()));
                    }
                }
                ChatTurn::Malformed { .. } => {}
            }
        }

        let skip = pairs.len().saturating_sub(num_chats);
        pairs.into_iter().skip(skip).collect()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_has_fresh_id() {
        let first = AssistantRun::new("user".to_string());
        let second = AssistantRun::new("user".to_string());

        assert_ne!(first.run_id(), second.run_id());
        assert!(Uuid::parse_str(first.run_id()).is_ok());
        assert!(first.transcript().is_empty());
    }

    #[test]
    fn test_push_turn_updates_timestamp() {
        let mut run = AssistantRun::new("user".to_string());
        let before = run.updated_at();
        run.push_turn(ChatTurn::user("hello"));

        assert_eq!(run.transcript().len(), 1);
        assert!(run.updated_at() >= before);
    }

    #[test]
    fn test_recent_pairs() {
        let mut run = AssistantRun::new("user".to_string());
        run.push_turn(ChatTurn::user("q1"));
        run.push_turn(ChatTurn::assistant("a1"));
        run.push_turn(ChatTurn::Malformed {
            raw: serde_json::json!(7),
        });
        run.push_turn(ChatTurn::user("q2"));
        run.push_turn(ChatTurn::assistant("a2"));
        run.push_turn(ChatTurn::user("unanswered"));

        assert_eq!(run.recent_pairs(1), vec![("q2", "a2")]);
        assert_eq!(run.recent_pairs(5), vec![("q1", "a1"), ("q2", "a2")]);
        assert!(run.recent_pairs(0).is_empty());
    }
}
