use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A user's progress on a lesson, optionally narrowed to one concept or
/// exercise of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Progress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    concept_id: Option<Uuid>,
    exercise_id: Option<Uuid>,
    completed: bool,
    score: Option<f64>,
    /// Seconds.
    time_spent: Option<i32>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Progress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Progress
    }
}

impl Progress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressUpdate {
    pub lesson_id: Uuid,
    pub concept_id: Option<Uuid>,
    pub exercise_id: Option<Uuid>,
    #[serde(default)]
    pub completed: bool,
    pub score: Option<f64>,
    pub time_spent: Option<i32>,
}

impl Progress {
    /// Upserts on (user, lesson, concept, exercise). `completed_at` is only
    /// stamped the first time the record becomes completed.
    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: ProgressUpdate,
    ) -> DatabaseResult<Self> {
        let progress = sqlx::query_as(
            r#"
            INSERT INTO progress
                (id, user_id, lesson_id, concept_id, exercise_id, completed, score, time_spent, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $6 THEN NOW() END)
            ON CONFLICT ON CONSTRAINT progress_target_key DO UPDATE SET
                completed = EXCLUDED.completed,
                score = COALESCE(EXCLUDED.score, progress.score),
                time_spent = COALESCE(EXCLUDED.time_spent, progress.time_spent),
                completed_at = COALESCE(progress.completed_at, EXCLUDED.completed_at),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(data.lesson_id)
        .bind(data.concept_id)
        .bind(data.exercise_id)
        .bind(data.completed)
        .bind(data.score)
        .bind(data.time_spent)
        .fetch_one(mm.executor())
        .await?;
        Ok(progress)
    }

    pub async fn all_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM progress WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all_by_user_lesson(
        mm: &ModelManager,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM progress WHERE user_id = $1 AND lesson_id = $2 ORDER BY created_at",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Distinct lessons with at least one completed record.
    pub async fn completed_lessons(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT lesson_id) FROM progress WHERE user_id = $1 AND completed",
        )
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

/// Percentage of lessons completed, rounded to two decimals.
pub fn overall_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn percentage_is_rounded() {
        assert_eq!(overall_percentage(1, 3), 33.33);
        assert_eq!(overall_percentage(2, 3), 66.67);
        assert_eq!(overall_percentage(0, 0), 0.0);
        assert_eq!(overall_percentage(4, 4), 100.0);
    }
}
