use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::RunHandler;

pub fn run_routes(run_handler: Arc<RunHandler>) -> Router {
    Router::new()
        .route("/users/{user_id}/runs", get(RunHandler::list_runs))
        .route("/runs/{run_id}", axum::routing::delete(RunHandler::delete_run))
        .route("/runs/{run_id}/history", get(RunHandler::get_history))
        .with_state(run_handler)
}
