use crate::homework::HomeworkBreakdown;
use crate::model::access::{HasOwner, check_access};
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// The latest homework breakdown a user uploaded for a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct HomeworkAssignment {
    id: Uuid,
    user_id: Uuid,
    course_code: String,
    title: String,
    original_filename: String,
    #[schema(value_type = HomeworkBreakdown)]
    exercises_data: Json<HomeworkBreakdown>,
    total_problems: i32,
    uploaded_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for HomeworkAssignment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Homework
    }
}

impl HomeworkAssignment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn breakdown(&self) -> &HomeworkBreakdown {
        &self.exercises_data.0
    }

    pub fn total_problems(&self) -> i32 {
        self.total_problems
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HomeworkAssignmentCreate {
    pub course_code: String,
    pub original_filename: String,
    pub breakdown: HomeworkBreakdown,
}

impl HomeworkAssignment {
    /// One assignment per (user, course): a new upload replaces the old one.
    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: HomeworkAssignmentCreate,
    ) -> DatabaseResult<Self> {
        let total = data.breakdown.problems.len() as i32;
        let assignment = sqlx::query_as(
            r#"
            INSERT INTO homework_assignments
                (id, user_id, course_code, title, original_filename, exercises_data, total_problems)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, course_code) DO UPDATE SET
                title = EXCLUDED.title,
                original_filename = EXCLUDED.original_filename,
                exercises_data = EXCLUDED.exercises_data,
                total_problems = EXCLUDED.total_problems,
                uploaded_at = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(&data.course_code)
        .bind(&data.breakdown.title)
        .bind(&data.original_filename)
        .bind(Json(&data.breakdown))
        .bind(total)
        .fetch_one(mm.executor())
        .await?;
        Ok(assignment)
    }

    /// Owner or admin only.
    pub async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()> {
        check_access(actor, &self)?;
        sqlx::query("DELETE FROM homework_assignments WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn find_for_course(
        mm: &ModelManager,
        user_id: Uuid,
        course_code: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM homework_assignments WHERE user_id = $1 AND course_code = $2",
        )
        .bind(user_id)
        .bind(course_code)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}

impl HasOwner for HomeworkAssignment {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
