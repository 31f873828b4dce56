pub mod page_dto;
pub mod response_dto;
pub mod run_dto;

pub use page_dto::*;
pub use response_dto::*;
pub use run_dto::*;
