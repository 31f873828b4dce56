pub mod health_routes;
pub mod page_routes;
pub mod run_routes;

pub use health_routes::*;
pub use page_routes::*;
pub use run_routes::*;
