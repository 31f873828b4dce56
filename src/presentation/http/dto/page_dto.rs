use serde::{Deserialize, Serialize};

use crate::presentation::ui::{PageInput, PageView};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
pub struct PageRequestDto {
    pub pdf_url: Option<String>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub new_session: bool,
    pub question: Option<String>,
}

fn default_user_id() -> String {
    "user".to_string()
}

impl From<PageRequestDto> for PageInput {
    fn from(dto: PageRequestDto) -> Self {
        Self {
            pdf_url: dto.pdf_url,
            user_id: dto.user_id,
            new_session: dto.new_session,
            question: dto.question,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponseDto {
    pub session_id: String,
    pub page: PageView,
}
