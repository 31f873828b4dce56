use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    DeleteRunError, DeleteRunUseCase, GetRunHistoryError, GetRunHistoryUseCase, ListUserRunsError,
    ListUserRunsUseCase,
};
use crate::presentation::http::dto::{
    ApiResponse, MessageResponseDto, RunHistoryResponseDto, RunListResponseDto,
};

pub struct RunHandler {
    list_user_runs_use_case: Arc<ListUserRunsUseCase>,
    get_run_history_use_case: Arc<GetRunHistoryUseCase>,
    delete_run_use_case: Arc<DeleteRunUseCase>,
}

impl RunHandler {
    pub fn new(
        list_user_runs_use_case: Arc<ListUserRunsUseCase>,
        get_run_history_use_case: Arc<GetRunHistoryUseCase>,
        delete_run_use_case: Arc<DeleteRunUseCase>,
    ) -> Self {
        Self {
            list_user_runs_use_case,
            get_run_history_use_case,
            delete_run_use_case,
        }
    }

    pub async fn list_runs(
        State(handler): State<Arc<RunHandler>>,
        Path(user_id): Path<String>,
    ) -> impl IntoResponse {
        match handler.list_user_runs_use_case.execute(&user_id).await {
            Ok(response) => (
                StatusCode::OK,
                Json(ApiResponse::success(RunListResponseDto::from(response))),
            ),
            Err(ListUserRunsError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "INVALID_USER_ID".to_string(),
                    msg,
                    None,
                )),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "LIST_RUNS_FAILED".to_string(),
                    "Failed to list runs".to_string(),
                    Some(e.to_string()),
                )),
            ),
        }
    }

    pub async fn get_history(
        State(handler): State<Arc<RunHandler>>,
        Path(run_id): Path<String>,
    ) -> impl IntoResponse {
        match handler.get_run_history_use_case.execute(&run_id).await {
            Ok(response) => (
                StatusCode::OK,
                Json(ApiResponse::success(RunHistoryResponseDto::from(response))),
            ),
            Err(GetRunHistoryError::RunNotFound(run_id)) => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "RUN_NOT_FOUND".to_string(),
                    format!("Run {} not found", run_id),
                    None,
                )),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "GET_HISTORY_FAILED".to_string(),
                    "Failed to read run history".to_string(),
                    Some(e.to_string()),
                )),
            ),
        }
    }

    pub async fn delete_run(
        State(handler): State<Arc<RunHandler>>,
        Path(run_id): Path<String>,
    ) -> impl IntoResponse {
        match handler.delete_run_use_case.execute(&run_id).await {
            Ok(()) => (
                StatusCode::OK,
                Json(ApiResponse::success(MessageResponseDto {
                    message: format!("Run {} deleted", run_id),
                })),
            ),
            Err(DeleteRunError::RunNotFound(run_id)) => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "RUN_NOT_FOUND".to_string(),
                    format!("Run {} not found", run_id),
                    None,
                )),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "DELETE_RUN_FAILED".to_string(),
                    "Failed to delete run".to_string(),
                    Some(e.to_string()),
                )),
            ),
        }
    }
}
