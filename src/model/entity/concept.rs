use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Concept {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    content: Option<String>,
    #[serde(rename = "order")]
    order_index: i32,
    analogy: Option<String>,
    /// How the concept ties back to a prerequisite course.
    course_connection: Option<String>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Concept {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Concept
    }
}

impl Concept {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ConceptCreate {
    /// Taken from the path when nested under a lesson.
    #[serde(default)]
    pub lesson_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    #[serde(rename = "order")]
    pub order_index: Option<i32>,
    pub analogy: Option<String>,
    pub course_connection: Option<String>,
}

impl Concept {
    pub async fn create(mm: &ModelManager, data: ConceptCreate) -> DatabaseResult<Self> {
        let concept = sqlx::query_as(
            "INSERT INTO concepts (id, lesson_id, title, content, order_index, analogy, course_connection) \
             VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.order_index.unwrap_or(0))
        .bind(&data.analogy)
        .bind(&data.course_connection)
        .fetch_one(mm.executor())
        .await?;
        Ok(concept)
    }

    pub async fn all_by_lesson(mm: &ModelManager, lesson_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM concepts WHERE lesson_id = $1 ORDER BY order_index")
                .bind(lesson_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }
}
