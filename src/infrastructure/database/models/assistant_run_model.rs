use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::{Value, json};

use crate::domain::entities::{
    AssistantRun,
    chat_turn::{decode_transcript, encode_transcript},
};
use crate::infrastructure::database::schema::pdf_assistant;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pdf_assistant)]
#[diesel(primary_key(run_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssistantRunModel {
    pub run_id: String,
    pub user_id: String,
    pub llm: Option<Value>,
    pub memory: Value,
    pub run_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pdf_assistant)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAssistantRunModel {
    pub run_id: String,
    pub user_id: String,
    pub llm: Option<Value>,
    pub memory: Value,
    pub run_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&AssistantRun> for NewAssistantRunModel {
    fn from(run: &AssistantRun) -> Self {
        Self {
            run_id: run.run_id().to_string(),
            user_id: run.user_id().to_string(),
            llm: run.llm().cloned(),
            memory: json!({ "chat_history": encode_transcript(run.transcript()) }),
            run_data: run.run_data().cloned(),
            created_at: run.created_at(),
            updated_at: run.updated_at(),
        }
    }
}

impl From<AssistantRunModel> for AssistantRun {
    /// The stored transcript is classified here, once, into chat turns.
    fn from(model: AssistantRunModel) -> Self {
        let history = model.memory.get("chat_history").unwrap_or(&Value::Null);

        AssistantRun::from_stored(
            model.run_id,
            model.user_id,
            model.llm,
            decode_transcript(history),
            model.run_data,
            model.created_at,
            model.updated_at,
        )
    }
}
