use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::PageHandler;

pub fn page_routes(page_handler: Arc<PageHandler>) -> Router {
    Router::new()
        .route("/page", post(PageHandler::render_page))
        .with_state(page_handler)
}
