use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::homework::HomeworkBreakdown;
use crate::model::entity::HomeworkAssignment;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomeworkUploaded {
    pub success: bool,
    pub data: HomeworkBreakdown,
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomeworkInfo {
    pub id: Uuid,
    pub title: String,
    pub original_filename: String,
    pub total_problems: i32,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomeworkResponse {
    pub success: bool,
    pub data: HomeworkBreakdown,
    pub homework_info: HomeworkInfo,
}

impl From<HomeworkAssignment> for HomeworkResponse {
    fn from(hw: HomeworkAssignment) -> Self {
        Self {
            success: true,
            data: hw.breakdown().clone(),
            homework_info: HomeworkInfo {
                id: hw.id(),
                title: hw.title().to_string(),
                original_filename: hw.original_filename().to_string(),
                total_problems: hw.total_problems(),
                uploaded_at: hw.uploaded_at(),
            },
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomeworkDeleted {
    pub success: bool,
    pub message: String,
}
