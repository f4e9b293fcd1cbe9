use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Exercise {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    problem: Option<String>,
    #[schema(value_type = Vec<String>)]
    hints: Json<Vec<String>>,
    solution: Option<String>,
    #[serde(rename = "order")]
    order_index: i32,
    course_connection: Option<String>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Exercise {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Exercise
    }
}

impl Exercise {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn hints(&self) -> &[String] {
        &self.hints.0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ExerciseCreate {
    /// Taken from the path when nested under a lesson.
    #[serde(default)]
    pub lesson_id: Uuid,
    pub title: String,
    pub problem: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub solution: Option<String>,
    #[serde(rename = "order")]
    pub order_index: Option<i32>,
    pub course_connection: Option<String>,
}

impl Exercise {
    pub async fn create(mm: &ModelManager, data: ExerciseCreate) -> DatabaseResult<Self> {
        let exercise = sqlx::query_as(
            "INSERT INTO exercises (id, lesson_id, title, problem, hints, solution, order_index, course_connection) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(&data.problem)
        .bind(Json(&data.hints))
        .bind(&data.solution)
        .bind(data.order_index.unwrap_or(0))
        .bind(&data.course_connection)
        .fetch_one(mm.executor())
        .await?;
        Ok(exercise)
    }

    pub async fn all_by_lesson(mm: &ModelManager, lesson_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM exercises WHERE lesson_id = $1 ORDER BY order_index")
                .bind(lesson_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }
}
