use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Progress on a generated weekly lesson, keyed by the front-end's lesson
/// identifier within a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    user_id: Uuid,
    course_code: String,
    lesson_id: String,
    completed: bool,
    progress: i32,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonProgressUpdate {
    pub course_code: String,
    pub lesson_id: String,
    pub completed: bool,
    /// Percentage, clamped to 0..=100.
    pub progress: i32,
}

impl LessonProgress {
    /// Upserts on (user, course, lesson); every completed write refreshes
    /// `completed_at`.
    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: LessonProgressUpdate,
    ) -> DatabaseResult<Self> {
        let progress = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, user_id, course_code, lesson_id, completed, progress, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $5 THEN NOW() END)
            ON CONFLICT (user_id, course_code, lesson_id) DO UPDATE SET
                completed = EXCLUDED.completed,
                progress = EXCLUDED.progress,
                completed_at = CASE
                    WHEN EXCLUDED.completed THEN NOW()
                    ELSE lesson_progress.completed_at
                END,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(&data.course_code)
        .bind(&data.lesson_id)
        .bind(data.completed)
        .bind(data.progress.clamp(0, 100))
        .fetch_one(mm.executor())
        .await?;
        Ok(progress)
    }

    pub async fn all_by_course(
        mm: &ModelManager,
        user_id: Uuid,
        course_code: &str,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE user_id = $1 AND course_code = $2 ORDER BY lesson_id",
        )
        .bind(user_id)
        .bind(course_code)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
