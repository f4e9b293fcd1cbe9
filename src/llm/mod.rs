//! Hosted language model access.
//!
//! Everything that talks to the model goes through [`LanguageModel`], so the
//! web layer and batch tools can run against a fake in tests.

use std::sync::Arc;

mod anthropic;
pub use anthropic::AnthropicClient;

mod error;
pub use error::{LlmError, LlmResult};

pub mod classify;
pub mod prompts;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub enum ContentBlock {
    Text(String),
    /// Raw document bytes; sent base64 encoded.
    Document { media_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub content: Vec<ContentBlock>,
    /// Overrides the client's configured limit.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(prompt.into())],
            max_tokens: None,
        }
    }

    /// A PDF followed by the instruction text.
    pub fn pdf_with_text(pdf: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            content: vec![
                ContentBlock::Document {
                    media_type: PDF_MEDIA_TYPE.to_string(),
                    data: pdf,
                },
                ContentBlock::Text(prompt.into()),
            ],
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Concatenated text blocks, mostly useful for fakes.
    pub fn prompt_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text(t) => Some(t.as_str()),
                ContentBlock::Document { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;
}

pub type SharedLanguageModel = Arc<dyn LanguageModel>;

/// Builds the configured client, or `None` when no API key is available.
pub fn from_config(cfg: &crate::config::Llm) -> LlmResult<Option<SharedLanguageModel>> {
    match AnthropicClient::from_config(cfg) {
        Ok(client) => Ok(Some(Arc::new(client))),
        Err(LlmError::MissingApiKey) => {
            tracing::warn!("no language model api key configured, ai features disabled");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
