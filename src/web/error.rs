use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::{CryptError, GoogleError},
    error::log_error,
    llm::LlmError,
    model::{DatabaseError, ResourceType},
    videos::VideoError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

/// Where a rejected session token came from.
#[derive(Debug, Clone, Copy)]
pub enum TokenCarrier {
    Cookie,
    Bearer,
}

impl std::fmt::Display for TokenCarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cookie => f.write_str("cookie"),
            Self::Bearer => f.write_str("bearer header"),
        }
    }
}

/// Sign-up, sign-in and session failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session token from {carrier} rejected: {error}")]
    TokenRejected {
        carrier: TokenCarrier,
        error: jsonwebtoken::errors::Error,
    },

    #[error("no session on a protected route")]
    SessionRequired,

    #[error("unknown email or wrong password")]
    BadCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("google sign-in not verified: {0}")]
    GoogleRejected(String),

    #[error("email belongs to an account with another sign-in method")]
    ProviderMismatch,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmailTaken | Self::ProviderMismatch => StatusCode::CONFLICT,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn client_display(&self) -> String {
        let message = match self {
            Self::TokenRejected { .. } => "Authentication error, session is invalid or expired",
            Self::SessionRequired => "Authentication required",
            Self::BadCredentials => "Authentication error, invalid email or password",
            Self::EmailTaken => "User with this email already exists",
            Self::GoogleRejected(_) => "Authentication error, Google sign-in could not be verified",
            Self::ProviderMismatch => "This email is registered with a different sign-in method",
        };
        String::from(message)
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{resource_type} not found")]
    NotFound { resource_type: ResourceType },

    #[error("{resource_type} forbidden")]
    Forbidden { resource_type: ResourceType },

    #[error("loading {resource_type} failed: {error}")]
    Fetch {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("{resource_type} conflicts with an existing row")]
    Conflict { resource_type: ResourceType },
}

/// Malformed input the handler could not work with.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Failures of the hosted services the API depends on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("crypt: {0}")]
    Crypt(#[from] CryptError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InternalError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error")
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Fetch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::NotFound {
                resource_type: ResourceType::Transcript,
            } => String::from("No transcript data found"),
            Self::NotFound {
                resource_type: ResourceType::Homework,
            } => String::from("No homework found for this course"),
            Self::NotFound { resource_type } => {
                format!("{} not found", capitalized(resource_type.label()))
            }
            Self::Forbidden { resource_type } => {
                format!("You don't have access to this {resource_type}")
            }
            Self::Fetch { resource_type, .. } => format!("Unable to load {resource_type}"),
            Self::Conflict { resource_type } => {
                format!("{} already exists", capitalized(resource_type.label()))
            }
        }
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::QuotaExceeded(_) => String::from("API quota exceeded. Please try again later."),
            Self::Unavailable(service) => format!("Service unavailable, {service} is not configured."),
            Self::Upstream(_) => String::from("Service error, upstream request failed."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("resource: {0}")]
    Resource(#[from] ResourceError),
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("request: {0}")]
    Request(#[from] RequestError),
    #[error("service: {0}")]
    Service(#[from] ServiceError),
    #[error("internal: {0}")]
    Internal(#[from] InternalError),
}

impl WebError {
    pub fn resource_not_found(resource_type: ResourceType) -> Self {
        ResourceError::NotFound { resource_type }.into()
    }

    pub fn resource_forbidden(resource_type: ResourceType) -> Self {
        ResourceError::Forbidden { resource_type }.into()
    }

    /// Repository failure while handling `resource_type`. Ownership refusals
    /// and unique violations keep their own status codes.
    pub fn resource_fetch_error(resource_type: ResourceType, error: DatabaseError) -> Self {
        if matches!(error, DatabaseError::Forbidden) {
            return Self::resource_forbidden(resource_type);
        }
        if error.is_unique_violation() {
            return ResourceError::Conflict { resource_type }.into();
        }
        ResourceError::Fetch {
            resource_type,
            error,
        }
        .into()
    }

    pub fn auth_token_rejected(carrier: TokenCarrier, error: jsonwebtoken::errors::Error) -> Self {
        AuthError::TokenRejected { carrier, error }.into()
    }

    pub fn auth_required() -> Self {
        AuthError::SessionRequired.into()
    }

    pub fn auth_invalid_credentials() -> Self {
        AuthError::BadCredentials.into()
    }

    pub fn registration_conflict() -> Self {
        AuthError::EmailTaken.into()
    }

    pub fn google_rejected<S: Into<String>>(reason: S) -> Self {
        AuthError::GoogleRejected(reason.into()).into()
    }

    pub fn provider_mismatch() -> Self {
        AuthError::ProviderMismatch.into()
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        RequestError::BadRequest(message.into()).into()
    }

    pub fn service_unavailable(service: &'static str) -> Self {
        ServiceError::Unavailable(service).into()
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        InternalError::Crypt(e).into()
    }

    pub fn server_io_error(e: std::io::Error) -> Self {
        InternalError::Io(e).into()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Resource(e) => e.status_code(),
            Self::Auth(e) => e.status_code(),
            Self::Request(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Internal(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::Resource(e) => e.client_display(),
            Self::Auth(e) => e.client_display(),
            Self::Request(e) => e.client_display(),
            Self::Service(e) => e.client_display(),
            Self::Internal(e) => e.client_display(),
        }
    }
}

impl From<LlmError> for WebError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::QuotaExceeded(msg) => ServiceError::QuotaExceeded(msg).into(),
            LlmError::MissingApiKey => Self::service_unavailable("language model"),
            e => ServiceError::Upstream(e.to_string()).into(),
        }
    }
}

impl From<VideoError> for WebError {
    fn from(e: VideoError) -> Self {
        match e {
            VideoError::QuotaExceeded(msg) => ServiceError::QuotaExceeded(msg).into(),
            VideoError::MissingApiKey => Self::service_unavailable("video search"),
            e => ServiceError::Upstream(e.to_string()).into(),
        }
    }
}

impl From<GoogleError> for WebError {
    fn from(e: GoogleError) -> Self {
        match e {
            GoogleError::Rejected(_) => Self::google_rejected(e.to_string()),
            e => ServiceError::Upstream(e.to_string()).into(),
        }
    }
}

/// Body of every error response.
#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Numeric status, as a string
    pub status_code: String,
    /// Internal error text; debug builds only
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            log_error(&self);
        } else {
            tracing::debug!("{status_code}: {self}");
        }

        let body = ErrorResponse {
            message: self.client_display(),
            status_code: status_code.as_str().to_string(),
            details: cfg!(debug_assertions).then(|| self.to_string()),
        };

        (status_code, Json(body)).into_response()
    }
}
