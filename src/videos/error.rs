use thiserror::Error;

pub type VideoResult<T> = std::result::Result<T, VideoError>;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("video search api key is not configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("video search quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("api error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl VideoError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}
