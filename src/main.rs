mod application;
mod domain;
mod infrastructure;
mod presentation;

#[cfg(test)]
mod test_support;

use infrastructure::{AppConfig, AppContainer};
use presentation::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Loaded before the logger so `.env` can set RUST_LOG.
    let dotenv_result = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match dotenv_result {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env file loaded: {}", e),
    }

    let config = AppConfig::from_env()?;

    let container = AppContainer::new(&config).await?;

    match container.vector_store.count(&container.collection).await {
        Ok(count) => tracing::info!(
            "{} chunks already stored in collection '{}'",
            count,
            container.collection
        ),
        Err(e) => tracing::warn!("Could not count stored chunks: {}", e),
    }

    let server = HttpServer::new(container.page_handler, container.run_handler, Some(config.port));
    server.run().await
}
