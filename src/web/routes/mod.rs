use crate::{
    Config, pdf,
    web::{AppState, WebError, WebResult, doc::ApiDoc},
};
use axum::{Json, Router, extract::Multipart, routing::get};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod classify;
pub mod courses;
pub mod homework;
pub mod lesson_progress;
pub mod lessons;
pub mod progress;
pub mod transcript;
pub mod week_videos;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// A PDF sent as multipart field `field`.
pub struct PdfUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Pulls `field` out of the form and checks it names a `.pdf` file; other
/// fields are skipped.
pub async fn read_pdf_upload(mut multipart: Multipart, field: &str) -> WebResult<PdfUpload> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::bad_request(e.body_text()))?
    {
        if part.name() != Some(field) {
            continue;
        }

        let filename = part.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(WebError::bad_request("No file selected"));
        }
        if !pdf::is_pdf_filename(&filename) {
            return Err(WebError::bad_request("Only PDF files are allowed"));
        }

        let bytes = part
            .bytes()
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?;
        return Ok(PdfUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(WebError::bad_request("No file provided"))
}

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .nest("/api/auth", auth::routes(state.clone()))
        .nest(
            "/api/courses",
            courses::routes(state.clone())
                .merge(lesson_progress::routes(state.clone()))
                .merge(homework::routes(state.clone())),
        )
        .nest("/api/lessons", lessons::routes(state.clone()))
        .nest("/api/progress", progress::routes(state.clone()))
        .nest("/api/transcript", transcript::routes(state.clone()))
        .nest("/api/week-videos", week_videos::routes(state.clone()))
        .nest("/api/classify", classify::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        router = router
            .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));
    }

    router
}

#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("healthy"),
        service: String::from(crate::APPLICATION_NAME),
    })
}

async fn index_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "CourseMate API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/health",
    }))
}
