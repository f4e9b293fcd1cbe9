use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::llm::{
    CompletionRequest, ContentBlock, LanguageModel,
    error::{LlmError, LlmResult, mentions_quota},
};

const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<WireBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text { text: String },
    Document { source: DocumentSource },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl From<ContentBlock> for WireBlock {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => WireBlock::Text { text },
            ContentBlock::Document { media_type, data } => WireBlock::Document {
                source: DocumentSource {
                    kind: "base64",
                    media_type,
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                },
            },
        }
    }
}

/// Client for the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> LlmResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens,
        })
    }

    pub fn from_config(cfg: &crate::config::Llm) -> LlmResult<Self> {
        let api_key = cfg.api_key().ok_or(LlmError::MissingApiKey)?;
        Self::new(api_key, cfg.base_url(), cfg.model(), cfg.max_tokens())
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn classify_failure(status: u16, body: String) -> LlmError {
    if status == 429 || mentions_quota(&body) {
        LlmError::QuotaExceeded(body)
    } else {
        LlmError::Api(status, body)
    }
}

fn collect_text(response: MessagesResponse) -> LlmResult<String> {
    let text = response
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait::async_trait]
impl LanguageModel for AnthropicClient {
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            messages: vec![Message {
                role: "user",
                content: request.content.into_iter().map(WireBlock::from).collect(),
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(url = %url, "sending completion request");

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "language model request failed");
            return Err(classify_failure(status.as_u16(), error_text));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        collect_text(parsed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn document_blocks_are_base64() {
        let wire = WireBlock::from(ContentBlock::Document {
            media_type: "application/pdf".into(),
            data: b"%PDF".to_vec(),
        });
        let value = serde_json::to_value(wire).unwrap();
        assert_eq!(value["type"], "document");
        assert_eq!(value["source"]["type"], "base64");
        assert_eq!(value["source"]["data"], "JVBERg==");
    }

    #[test]
    fn failures_are_classified() {
        assert!(classify_failure(429, String::new()).is_quota());
        assert!(classify_failure(400, "Your credit quota is exhausted".into()).is_quota());
        assert!(matches!(
            classify_failure(500, "boom".into()),
            LlmError::Api(500, _)
        ));
    }

    #[tokio::test]
    async fn completes_against_messages_endpoint() {
        let app = Router::new().route(
            "/v1/messages",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "user");
                assert_eq!(body["max_tokens"], 123);
                Json(json!({
                    "content": [
                        {"type": "text", "text": "Hello, "},
                        {"type": "tool_use", "id": "x"},
                        {"type": "text", "text": "world"}
                    ]
                }))
            }),
        );
        let base = serve(app).await;

        let client = AnthropicClient::new("key", base, "test-model", 4000).unwrap();
        let text = client
            .complete(CompletionRequest::text("hi").with_max_tokens(123))
            .await
            .unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn rate_limited_is_quota() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(app).await;

        let client = AnthropicClient::new("key", base, "test-model", 4000).unwrap();
        let err = client
            .complete(CompletionRequest::text("hi"))
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }
}
