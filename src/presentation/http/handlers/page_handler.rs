use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::presentation::http::dto::{
    ApiResponse, PageRequestDto, PageResponseDto, SESSION_HEADER,
};
use crate::presentation::ui::{PageInput, SessionStore, UiController};

pub struct PageHandler {
    controller: Arc<UiController>,
    sessions: Arc<SessionStore>,
}

impl PageHandler {
    pub fn new(controller: Arc<UiController>, sessions: Arc<SessionStore>) -> Self {
        Self {
            controller,
            sessions,
        }
    }

    /// One render pass. Passes for the same UI session are serialized on the
    /// session's lock.
    pub async fn render_page(
        State(handler): State<Arc<PageHandler>>,
        headers: HeaderMap,
        Json(request): Json<PageRequestDto>,
    ) -> impl IntoResponse {
        let requested_id = headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok());
        let (session_id, state) = handler.sessions.entry(requested_id).await;

        let input = PageInput::from(request);
        let page = {
            let mut state = state.lock().await;
            handler.controller.render(&input, &mut state).await
        };

        let mut response_headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            response_headers.insert(SESSION_HEADER, value);
        }

        (
            StatusCode::OK,
            response_headers,
            Json(ApiResponse::success(PageResponseDto { session_id, page })),
        )
    }
}
