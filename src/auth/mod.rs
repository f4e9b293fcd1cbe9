//! Password hashing, session tokens and Google sign-in verification.

mod error;
mod google;
mod jwt;
mod password;

pub use error::{CryptError, CryptResult, GoogleError, GoogleResult};
pub use google::{GoogleClient, GoogleUser, GoogleVerifier, SharedGoogleVerifier};
pub use jwt::{UserClaims, generate_token, process_token};
pub use password::{hash_password, verify_password};
