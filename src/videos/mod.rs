//! Educational video recommendations for course weeks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod error;
pub use error::{VideoError, VideoResult};

mod youtube;
pub use youtube::YouTubeClient;

mod search;
pub use search::{EDUCATIONAL_CHANNELS, EducationalSearch, MAX_DURATION_SECS, parse_duration};

mod topics;
pub use topics::{extract_topics, search_queries};

mod processor;
pub use processor::{
    CourseVideoReport, MAX_VIDEOS_LIMIT, WeekVideoSink, find_videos_for_week,
    process_course_weeks, topic_for_title,
};

/// A search hit as returned by the video API.
#[derive(Debug, Clone, Default)]
pub struct SearchItem {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub thumbnail_url: String,
    pub published_at: String,
}

#[derive(Debug, Clone)]
pub struct VideoDetails {
    pub video_id: String,
    /// ISO-8601 duration, e.g. `PT4M13S`.
    pub duration: String,
}

/// A scored video ready to be stored for a course week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VideoCandidate {
    pub channel: String,
    pub title: String,
    pub description: String,
    pub video_id: String,
    pub url: String,
    pub thumbnail: String,
    pub published_at: String,
    pub duration: String,
    pub duration_seconds: i32,
    pub relevance_score: f64,
}

#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    /// Searches videos, optionally restricted to one channel.
    async fn search(
        &self,
        query: &str,
        channel_id: Option<&str>,
        max_results: u32,
    ) -> VideoResult<Vec<SearchItem>>;

    async fn details(&self, video_id: &str) -> VideoResult<Option<VideoDetails>>;
}

pub type SharedVideoSearch = Arc<dyn VideoSearch>;

/// Builds the configured client, or `None` when no API key is available.
pub fn from_config(cfg: &crate::config::YouTube) -> VideoResult<Option<SharedVideoSearch>> {
    match YouTubeClient::from_config(cfg) {
        Ok(client) => Ok(Some(Arc::new(client))),
        Err(VideoError::MissingApiKey) => {
            tracing::warn!("no video search api key configured, video features disabled");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
