use thiserror::Error;

pub type LlmResult<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model api key is not configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("language model quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("api error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("language model returned no text")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}

/// Usage-limit failures are reported as 429s or with wording in the body.
pub(crate) fn mentions_quota(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["quota", "rate limit", "rate_limit", "exceeded"]
        .iter()
        .any(|needle| lower.contains(needle))
}
