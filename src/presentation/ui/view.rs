use serde::Serialize;

use crate::domain::entities::ChatTurn;

pub const PAGE_TITLE: &str = "PDF Assistant";
pub const SIDEBAR_TITLE: &str = "Session Settings";
pub const QUESTION_HEADING: &str = "Ask a Question";
pub const RESPONSE_HEADING: &str = "Response";
pub const HISTORY_HEADING: &str = "Chat History";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "text", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text)
            | Notice::Warning(text)
            | Notice::Error(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarView {
    pub title: String,
    pub lines: Vec<String>,
    pub history_heading: String,
    pub chat_history: Vec<String>,
}

impl Default for SidebarView {
    fn default() -> Self {
        Self {
            title: SIDEBAR_TITLE.to_string(),
            lines: Vec::new(),
            history_heading: HISTORY_HEADING.to_string(),
            chat_history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseView {
    pub heading: String,
    pub text: String,
}

/// Everything one render pass produced, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub title: String,
    pub sidebar: SidebarView,
    /// Spinner captions shown while the pass was working.
    pub spinners: Vec<String>,
    pub notices: Vec<Notice>,
    pub run_id: Option<String>,
    pub question_heading: Option<String>,
    pub response: Option<ResponseView>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            title: PAGE_TITLE.to_string(),
            sidebar: SidebarView::default(),
            spinners: Vec::new(),
            notices: Vec::new(),
            run_id: None,
            question_heading: None,
            response: None,
        }
    }
}

impl PageView {
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn has_notice(&self, text: &str) -> bool {
        self.notices.iter().any(|n| n.text() == text)
    }
}

pub fn render_turn(turn: &ChatTurn) -> String {
    match turn {
        ChatTurn::User { content } => format!("**You:** {}", content),
        ChatTurn::Assistant { content } => format!("**Assistant:** {}", content),
        ChatTurn::Malformed { raw } => format!("Unexpected chat entry format: {}", raw),
    }
}

pub fn render_history(turns: &[ChatTurn]) -> Vec<String> {
    turns.iter().map(render_turn).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_history() {
        let turns = vec![
            ChatTurn::user("What goes in green curry?"),
            ChatTurn::assistant("Green chilies, coconut milk and Thai basil."),
            ChatTurn::Malformed {
                raw: json!("stray string"),
            },
        ];

        assert_eq!(
            render_history(&turns),
            vec![
                "**You:** What goes in green curry?".to_string(),
                "**Assistant:** Green chilies, coconut milk and Thai basil.".to_string(),
                "Unexpected chat entry format: \"stray string\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_notice_serialization() {
        let notice = Notice::Warning("careful".to_string());
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            json!({ "level": "warning", "text": "careful" })
        );
    }

    #[test]
    fn test_default_page() {
        let page = PageView::default();
        assert_eq!(page.title, "PDF Assistant");
        assert_eq!(page.sidebar.title, "Session Settings");
        assert!(page.notices.is_empty());
    }
}
