// ABOUTME: Main entry point for the photo sharing backend
// ABOUTME: Loads configuration, wires the stores and auth gate into shared state, and serves the API

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod auth;
mod blob;
mod config;
mod entities;
mod error;
mod middleware;
mod migration;
mod photos;
mod routes;
mod session;
mod storage;
mod types;

#[cfg(test)]
mod photos_tests;

use auth::{JwtVerifier, TokenVerifier};
use blob::FsBlobStore;
use config::Config;
use photos::PhotoService;
use storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub photos: PhotoService,
    pub verifier: Arc<dyn TokenVerifier>,
    pub auth_cookie_name: String,
}

impl AppState {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(&config.database_url).await?);
        let blobs = Arc::new(FsBlobStore::new(&config.image_dir).await?);

        Ok(Self {
            photos: PhotoService::new(storage, blobs),
            verifier: Arc::new(JwtVerifier::new(&config.jwt_secret)),
            auth_cookie_name: config.auth_cookie_name.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("photoshare=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    let app = routes::build_router(state, config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        image_dir = %config.image_dir,
        "photoshare listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
