use serde::{Deserialize, Serialize};

use crate::model::entity::UserEntity;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

/// Sent by the OAuth front-end after Google sign-in. The profile is read
/// from Google with this token; nothing else from the client is trusted.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GoogleAuthBody {
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserEntity,
}
