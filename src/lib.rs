pub mod config;
pub mod db;
pub mod middleware;
pub mod rec;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str) -> Result<(), ServerError> {
    let config = config::Config::load(config_path)?;

    info!("Using config file: {}", config_path);
    info!("Schema variant: {:?}", config.schema);

    let db_path = config.database_path();
    info!("Opening database at {}", db_path);
    let db = Arc::new(db::SqliteRepository::new(&db_path, config.schema).await?);

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let state = server::AppState::new(config.clone(), db);
    let app = server::build_router(state);

    info!("Serving HTTP on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
