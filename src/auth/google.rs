use std::{sync::Arc, time::Duration};

use serde::Deserialize;

use crate::auth::{GoogleError, GoogleResult};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Profile returned by Google's userinfo endpoint for an OAuth access token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Resolves an access token handed in by the browser to the Google account
/// it was issued for.
#[async_trait::async_trait]
pub trait GoogleVerifier: Send + Sync {
    async fn userinfo(&self, access_token: &str) -> GoogleResult<GoogleUser>;
}

pub type SharedGoogleVerifier = Arc<dyn GoogleVerifier>;

#[derive(Debug, Clone)]
pub struct GoogleClient {
    http_client: reqwest::Client,
    userinfo_url: String,
}

impl GoogleClient {
    pub fn new(userinfo_url: impl Into<String>) -> GoogleResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GoogleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            userinfo_url: userinfo_url.into(),
        })
    }

    pub fn from_config(cfg: &crate::config::Google) -> GoogleResult<Self> {
        Self::new(cfg.userinfo_url())
    }
}

#[async_trait::async_trait]
impl GoogleVerifier for GoogleClient {
    #[tracing::instrument(skip_all)]
    async fn userinfo(&self, access_token: &str) -> GoogleResult<GoogleUser> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GoogleError::Rejected(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| GoogleError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, response::IntoResponse, routing::get};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/userinfo")
    }

    async fn userinfo(headers: HeaderMap) -> impl IntoResponse {
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if bearer != "Bearer good-token" {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_token"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "id": "1234",
                "email": "ada@gmail.com",
                "verified_email": true,
                "name": "Ada Lovelace",
                "picture": "http://img"
            })),
        )
    }

    #[tokio::test]
    async fn reads_profile_with_bearer_token() {
        let app = Router::new().route("/userinfo", get(userinfo));
        let client = GoogleClient::new(serve(app).await).unwrap();

        let user = client.userinfo("good-token").await.unwrap();
        assert_eq!(user.id, "1234");
        assert_eq!(user.email, "ada@gmail.com");
        assert!(user.verified_email);
        assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn rejected_token() {
        let app = Router::new().route("/userinfo", get(userinfo));
        let client = GoogleClient::new(serve(app).await).unwrap();

        let err = client.userinfo("forged").await.unwrap_err();
        assert!(matches!(err, GoogleError::Rejected(401)));
    }

    #[tokio::test]
    async fn missing_verified_flag_means_unverified() {
        let app = Router::new().route(
            "/userinfo",
            get(|| async { Json(json!({"id": "1", "email": "x@gmail.com"})) }),
        );
        let client = GoogleClient::new(serve(app).await).unwrap();

        let user = client.userinfo("any").await.unwrap();
        assert!(!user.verified_email);
        assert!(user.name.is_none());
    }
}
