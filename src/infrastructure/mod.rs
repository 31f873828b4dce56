pub mod config;
pub mod container;
pub mod database;
pub mod external_services;

// Re-export commonly used items
pub use config::AppConfig;
pub use container::AppContainer;
