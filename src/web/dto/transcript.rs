use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Recommendation};
use crate::model::entity::{CourseStatus, UserCourse};
use crate::transcript::ParsedTranscript;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TranscriptTextBody {
    pub text: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TranscriptUploaded {
    pub message: String,
    pub parsed_data: ParsedTranscript,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExistingTranscript {
    pub transcript_uploaded: bool,
    pub parsed_data: ParsedTranscript,
    pub uploaded_at: DateTime<Utc>,
}

/// A course on the user's record joined with its catalog entry.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TranscriptCourse {
    pub course_code: String,
    pub status: CourseStatus,
    pub grade: Option<String>,
    pub semester: Option<String>,
    pub units: Option<i32>,
    pub website: String,
    pub category: String,
    pub prerequisites: Vec<String>,
}

impl From<&UserCourse> for TranscriptCourse {
    fn from(c: &UserCourse) -> Self {
        let info = catalog::info(c.course_code());
        Self {
            course_code: c.course_code().to_string(),
            status: c.status(),
            grade: c.grade().map(str::to_string),
            semester: c.semester().map(str::to_string),
            units: c.units(),
            website: info.website,
            category: info.category,
            prerequisites: info.prerequisites,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GroupedCourses {
    pub completed: Vec<TranscriptCourse>,
    pub current: Vec<TranscriptCourse>,
    pub planned: Vec<TranscriptCourse>,
}

impl GroupedCourses {
    pub fn from_rows(rows: &[UserCourse]) -> Self {
        let mut grouped = Self::default();
        for row in rows {
            let course = TranscriptCourse::from(row);
            match course.status {
                CourseStatus::Completed => grouped.completed.push(course),
                CourseStatus::Current => grouped.current.push(course),
                CourseStatus::Planned => grouped.planned.push(course),
            }
        }
        grouped
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub completed_courses: Vec<String>,
    pub current_courses: Vec<String>,
}
