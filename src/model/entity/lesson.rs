use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: Option<String>,
    week: Option<i32>,
    #[serde(rename = "order")]
    order_index: i32,
    /// Minutes.
    duration: Option<i32>,
    difficulty: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn week(&self) -> Option<i32> {
        self.week
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub week: Option<i32>,
    #[serde(rename = "order")]
    pub order_index: Option<i32>,
    pub duration: Option<i32>,
    pub difficulty: Option<String>,
    pub is_active: Option<bool>,
}

impl Lesson {
    pub async fn create(mm: &ModelManager, data: LessonCreate) -> DatabaseResult<Self> {
        let lesson = sqlx::query_as(
            "INSERT INTO lessons (id, course_id, title, description, week, order_index, duration, difficulty, is_active) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.week)
        .bind(data.order_index.unwrap_or(0))
        .bind(data.duration)
        .bind(&data.difficulty)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(mm.executor())
        .await?;
        Ok(lesson)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let found = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(found)
    }

    /// Active lessons of a course ordered by week, then order.
    pub async fn all_by_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lessons WHERE course_id = $1 AND is_active \
             ORDER BY week NULLS LAST, order_index",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_active(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE is_active")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}
