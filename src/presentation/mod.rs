pub mod http;
pub mod ui;
