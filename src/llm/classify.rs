//! Lesson topic classification against a course's topic list.

use std::path::{Path, PathBuf};

use crate::llm::{CompletionRequest, LanguageModel, LlmResult, prompts};

/// `<topics_dir>/topics_<CODE>.json`; its keys are the topic names in order.
pub fn topics_file(topics_dir: &Path, course_code: &str) -> PathBuf {
    topics_dir.join(format!("topics_{course_code}.json"))
}

/// Topic names of a course, `Ok(None)` when the course has no topics file.
pub async fn load_topics(
    topics_dir: &Path,
    course_code: &str,
) -> std::io::Result<Option<Vec<String>>> {
    let path = topics_file(topics_dir, course_code);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let topics = value
        .as_object()
        .map(|map| map.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    Ok(Some(topics))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicMatch {
    /// The model named a listed topic, or one contains the other.
    Matched(String),
    /// Nothing matched; the first topic is used.
    Fallback(String),
}

impl TopicMatch {
    pub fn topic(&self) -> &str {
        match self {
            Self::Matched(t) | Self::Fallback(t) => t,
        }
    }
}

/// Maps the model's reply onto the topic list: exact name first, then
/// case-insensitive containment in either direction, else the first topic.
pub fn match_topic(reply: &str, topics: &[String]) -> Option<TopicMatch> {
    let reply = reply.trim();
    if let Some(exact) = topics.iter().find(|t| t.as_str() == reply) {
        return Some(TopicMatch::Matched(exact.clone()));
    }

    let lower = reply.to_lowercase();
    let close = topics.iter().find(|t| {
        let topic = t.to_lowercase();
        topic.contains(&lower) || lower.contains(&topic)
    });
    match close {
        Some(t) => Some(TopicMatch::Matched(t.clone())),
        None => topics.first().map(|t| TopicMatch::Fallback(t.clone())),
    }
}

#[tracing::instrument(skip(llm, topics, content))]
pub async fn classify_topic(
    llm: &dyn LanguageModel,
    course_code: &str,
    topics: &[String],
    content: &str,
) -> LlmResult<Option<TopicMatch>> {
    let reply = llm
        .complete(
            CompletionRequest::text(prompts::classify_topic(course_code, topics, content))
                .with_max_tokens(prompts::CLASSIFY_MAX_TOKENS),
        )
        .await?;
    tracing::debug!("model answered {reply:?}");
    Ok(match_topic(&reply, topics))
}
