use serde::Serialize;

use crate::application::use_cases::{GetRunHistoryResponse, ListUserRunsResponse};
use crate::domain::entities::ChatTurn;
use crate::presentation::ui::view::render_history;

#[derive(Debug, Serialize)]
pub struct RunListResponseDto {
    pub user_id: String,
    pub run_ids: Vec<String>,
    pub total: usize,
}

impl From<ListUserRunsResponse> for RunListResponseDto {
    fn from(response: ListUserRunsResponse) -> Self {
        Self {
            total: response.run_ids.len(),
            user_id: response.user_id,
            run_ids: response.run_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunHistoryResponseDto {
    pub run_id: String,
    pub user_id: String,
    /// Display lines, one per transcript entry.
    pub lines: Vec<String>,
    pub turns: Vec<ChatTurn>,
}

impl From<GetRunHistoryResponse> for RunHistoryResponseDto {
    fn from(response: GetRunHistoryResponse) -> Self {
        Self {
            lines: render_history(&response.history),
            run_id: response.run_id,
            user_id: response.user_id,
            turns: response.history,
        }
    }
}
