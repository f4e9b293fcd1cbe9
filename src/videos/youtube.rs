use std::time::Duration;

use serde::Deserialize;

use crate::videos::{SearchItem, VideoDetails, VideoError, VideoResult, VideoSearch};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "dailyLimitExceeded",
    "userRateLimitExceeded",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// YouTube Data API v3 client.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> VideoResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VideoError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &crate::config::YouTube) -> VideoResult<Self> {
        let api_key = cfg.api_key().ok_or(VideoError::MissingApiKey)?;
        Self::new(api_key, cfg.base_url())
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> VideoResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| VideoError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| VideoError::Parse(e.to_string()))
    }
}

fn classify_failure(status: u16, body: String) -> VideoError {
    let quota_reason = QUOTA_REASONS.iter().any(|r| body.contains(r));
    if status == 429 || (status == 403 && quota_reason) {
        VideoError::QuotaExceeded(body)
    } else {
        VideoError::Api(status, body)
    }
}

#[async_trait::async_trait]
impl VideoSearch for YouTubeClient {
    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        channel_id: Option<&str>,
        max_results: u32,
    ) -> VideoResult<Vec<SearchItem>> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "id,snippet"),
            ("q", query),
            ("type", "video"),
            ("order", "relevance"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(channel_id) = channel_id {
            params.push(("channelId", channel_id));
        }

        let response: SearchResponse = self.get("search", &params).await?;
        let items = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let snippet = item.snippet;
                let thumbnail_url = snippet
                    .thumbnails
                    .medium
                    .or(snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                Some(SearchItem {
                    video_id,
                    title: snippet.title,
                    description: snippet.description,
                    channel_title: snippet.channel_title,
                    thumbnail_url,
                    published_at: snippet.published_at,
                })
            })
            .collect();
        Ok(items)
    }

    #[tracing::instrument(skip(self))]
    async fn details(&self, video_id: &str) -> VideoResult<Option<VideoDetails>> {
        let response: VideosResponse = self
            .get("videos", &[("part", "contentDetails"), ("id", video_id)])
            .await?;

        Ok(response.items.into_iter().next().map(|v| VideoDetails {
            video_id: v.id,
            duration: v.content_details.duration,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn quota_classification() {
        assert!(classify_failure(403, r#"{"reason":"quotaExceeded"}"#.into()).is_quota());
        assert!(classify_failure(429, String::new()).is_quota());
        assert!(!classify_failure(403, "forbidden".into()).is_quota());
    }

    #[tokio::test]
    async fn search_and_details() {
        let app = Router::new()
            .route(
                "/search",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("key").map(String::as_str), Some("k"));
                    assert_eq!(q.get("channelId").map(String::as_str), Some("chan"));
                    Json(json!({
                        "items": [
                            {
                                "id": {"videoId": "abc"},
                                "snippet": {
                                    "title": "Paging",
                                    "description": "virtual memory",
                                    "channelTitle": "Khan Academy",
                                    "publishedAt": "2020-01-01T00:00:00Z",
                                    "thumbnails": {"medium": {"url": "http://img"}}
                                }
                            },
                            {"id": {"playlistId": "p"}, "snippet": {"title": "skip"}}
                        ]
                    }))
                }),
            )
            .route(
                "/videos",
                get(|| async {
                    Json(json!({
                        "items": [{"id": "abc", "contentDetails": {"duration": "PT4M13S"}}]
                    }))
                }),
            );
        let client = YouTubeClient::new("k", serve(app).await).unwrap();

        let items = client.search("paging", Some("chan"), 2).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].video_id, "abc");
        assert_eq!(items[0].thumbnail_url, "http://img");

        let details = client.details("abc").await.unwrap().unwrap();
        assert_eq!(details.duration, "PT4M13S");
    }

    #[tokio::test]
    async fn quota_response() {
        let app = Router::new().route(
            "/search",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    r#"{"error":{"errors":[{"reason":"quotaExceeded"}]}}"#,
                )
            }),
        );
        let client = YouTubeClient::new("k", serve(app).await).unwrap();
        let err = client.search("x", None, 1).await.unwrap_err();
        assert!(err.is_quota());
    }
}
