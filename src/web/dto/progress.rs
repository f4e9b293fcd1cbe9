use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::entity::{LessonProgress, Progress};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressSummary {
    /// Percentage of active lessons completed, two decimals.
    pub overall_progress: f64,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    pub progress_records: Vec<Progress>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressBody {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: i32,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressEntry {
    pub completed: bool,
    pub progress: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&LessonProgress> for LessonProgressEntry {
    fn from(p: &LessonProgress) -> Self {
        Self {
            completed: p.completed(),
            progress: p.progress(),
            completed_at: p.completed_at(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonProgressSaved {
    pub message: String,
    pub progress: LessonProgress,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressMap {
    pub progress: BTreeMap<String, LessonProgressEntry>,
}
