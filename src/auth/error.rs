use thiserror::Error;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("password hash error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type GoogleResult<T> = std::result::Result<T, GoogleError>;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("google rejected the access token ({0})")]
    Rejected(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("userinfo error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}
