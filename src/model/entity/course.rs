use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    instructor: Option<String>,
    semester: Option<String>,
    units: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub semester: Option<String>,
    pub units: Option<i32>,
    pub is_active: Option<bool>,
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            "INSERT INTO courses (id, code, name, description, instructor, semester, units, is_active) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.code)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.instructor)
        .bind(&data.semester)
        .bind(data.units)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(mm.executor())
        .await?;
        Ok(course)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let is_active = data.is_active.unwrap_or(self.is_active);
        sqlx::query(
            "UPDATE courses SET code = $1, name = $2, description = $3, instructor = $4, \
             semester = $5, units = $6, is_active = $7 WHERE id = $8",
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.instructor)
        .bind(&data.semester)
        .bind(data.units)
        .bind(is_active)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.code = data.code;
        self.name = data.name;
        self.description = data.description;
        self.instructor = data.instructor;
        self.semester = data.semester;
        self.units = data.units;
        self.is_active = is_active;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let found = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(found)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY code LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Course, CourseCreate, Uuid);

impl Course {
    pub async fn list_active(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE is_active ORDER BY code")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_code(mm: &ModelManager, code: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE code = $1")
            .bind(code)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
