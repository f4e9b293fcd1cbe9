use thiserror::Error;
use tracing::error;
use tracing_error::SpanTrace;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("database error: {0}")]
    DatabaseError(#[from] crate::model::DatabaseError),
    #[error("language model error: {0}")]
    LlmError(#[from] crate::llm::LlmError),
    #[error("video search error: {0}")]
    VideoError(#[from] crate::videos::VideoError),
    #[error("materials error: {0}")]
    MaterialsError(#[from] crate::materials::MaterialsError),
    #[error("pdf error: {0}")]
    PdfError(#[from] crate::pdf::PdfError),
    #[error("study guide error: {0}")]
    GuideError(#[from] crate::study_guide::GuideError),
    #[error("crypt error: {0}")]
    CryptError(#[from] crate::auth::CryptError),
    #[error("google sign-in error: {0}")]
    GoogleError(#[from] crate::auth::GoogleError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

pub async fn run_with_error_handler<F, T>(run: F) -> T
where
    F: AsyncFn() -> AppResult<T>,
    T: Send + Sync,
{
    match run().await {
        Ok(value) => value,
        Err(e) => {
            default_error_handler(e);
            std::process::exit(1);
        }
    }
}

fn default_error_handler(error: AppError) {
    let span = SpanTrace::capture();
    error!("{}\n{}", error, span);
}

pub fn log_error<E: std::error::Error + std::fmt::Display>(error: &E) {
    let span = SpanTrace::capture();
    error!("{}\n{}", error, span);
}
