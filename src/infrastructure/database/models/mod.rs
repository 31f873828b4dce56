pub mod assistant_run_model;
pub mod document_model;

pub use assistant_run_model::*;
pub use document_model::*;
