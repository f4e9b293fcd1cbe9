use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::entity::WeekVideo;
use crate::videos::{CourseVideoReport, VideoCandidate};

pub const DEFAULT_MAX_VIDEOS: usize = 3;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WeekVideosResponse {
    pub course_code: String,
    pub week_number: i32,
    pub videos: Vec<WeekVideo>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseVideosResponse {
    pub course_code: String,
    pub videos_by_week: BTreeMap<i32, Vec<WeekVideo>>,
    pub total_weeks: usize,
    pub total_videos: usize,
}

impl CourseVideosResponse {
    pub fn new(course_code: String, videos: Vec<WeekVideo>) -> Self {
        let total_videos = videos.len();
        let mut videos_by_week: BTreeMap<i32, Vec<WeekVideo>> = BTreeMap::new();
        for video in videos {
            videos_by_week
                .entry(video.week_number())
                .or_default()
                .push(video);
        }
        Self {
            course_code,
            total_weeks: videos_by_week.len(),
            videos_by_week,
            total_videos,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GenerateCourseBody {
    pub course_path: Option<String>,
    /// 1 to 50, default 3.
    pub max_videos_per_week: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GenerateCourseResponse {
    pub success: bool,
    pub course_code: String,
    pub results: CourseVideoReport,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quota_exceeded: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GenerateWeekBody {
    pub study_guide_path: Option<String>,
    /// 1 to 50, default 3.
    pub max_videos: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GenerateWeekResponse {
    pub success: bool,
    pub course_code: String,
    pub week_number: i32,
    pub videos: Vec<VideoCandidate>,
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuotaExceededResponse {
    pub success: bool,
    pub error: String,
    pub quota_exceeded: bool,
}

/// Returned instead of a list when nothing was stored or found.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NoVideosResponse {
    pub message: String,
    pub videos: Vec<WeekVideo>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ClassifyBody {
    pub content: Option<String>,
    #[serde(rename = "courseCode")]
    pub course_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClassifyResponse {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
