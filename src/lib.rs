use std::sync::Arc;

use crate::auth::{GoogleClient, SharedGoogleVerifier};
use crate::llm::SharedLanguageModel;
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::videos::SharedVideoSearch;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod catalog;
pub mod error;
pub mod homework;
pub mod llm;
pub mod materials;
pub mod model;
pub mod pdf;
pub mod study_guide;
pub mod transcript;
pub mod utils;
pub mod videos;
pub mod web;

static APPLICATION_NAME: &str = "coursemate";

/// Loads config, migrates the database and wires the hosted services that
/// have api keys configured.
pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let db = DbConnection::connect(config.app().database_uri())?;
    db.migrate().await?;

    let llm = llm::from_config(config.llm())?;
    let videos = videos::from_config(config.youtube())?;
    let google: SharedGoogleVerifier = Arc::new(GoogleClient::from_config(config.google())?);
    build_server_with_services(db, llm, videos, google).await
}

pub async fn build_server_with_services(
    db: DbConnection,
    llm: Option<SharedLanguageModel>,
    videos: Option<SharedVideoSearch>,
    google: SharedGoogleVerifier,
) -> AppResult<(AppState, Router)> {
    let config = Config::get_or_init(true).await;

    let mm = ModelManager::new(db);
    let state = AppState::new(mm, config, llm, videos, google);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let bindto = state.config().host().bindto();
    let listener = TcpListener::bind(bindto).await?;

    tracing::info!("axum is starting at: {bindto}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` is read from the environment
/// or a `.env` file.
pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coursemate=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
