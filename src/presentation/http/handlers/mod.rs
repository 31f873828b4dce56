pub mod page_handler;
pub mod run_handler;

pub use page_handler::PageHandler;
pub use run_handler::RunHandler;
