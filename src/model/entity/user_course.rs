use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::transcript::ParsedTranscript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Completed,
    Current,
    Planned,
}

impl From<&str> for CourseStatus {
    fn from(value: &str) -> Self {
        match value {
            "completed" => CourseStatus::Completed,
            "current" => CourseStatus::Current,
            _ => CourseStatus::Planned,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Completed => write!(f, "completed"),
            CourseStatus::Current => write!(f, "current"),
            CourseStatus::Planned => write!(f, "planned"),
        }
    }
}

/// A course on a user's record, as taken from their transcript.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserCourse {
    id: Uuid,
    user_id: Uuid,
    course_code: String,
    status: String,
    grade: Option<String>,
    semester: Option<String>,
    units: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for UserCourse {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::UserCourse
    }
}

impl UserCourse {
    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn status(&self) -> CourseStatus {
        CourseStatus::from(self.status.as_str())
    }

    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    pub fn semester(&self) -> Option<&str> {
        self.semester.as_deref()
    }

    pub fn units(&self) -> Option<i32> {
        self.units
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserCourseCreate {
    pub course_code: String,
    pub status: CourseStatus,
    pub grade: Option<String>,
    pub semester: Option<String>,
    pub units: Option<i32>,
}

impl UserCourseCreate {
    /// Rows for a parsed transcript: completed courses keep their grade,
    /// current ones are stamped with the current semester.
    pub fn from_transcript(parsed: &ParsedTranscript) -> Vec<Self> {
        let semester = &parsed.semester_info;
        let current_semester = (!semester.current_semester.is_empty())
            .then(|| format!("{} {}", semester.current_semester, semester.current_year));

        let completed = parsed.completed_courses.iter().map(|c| Self {
            course_code: c.course_code.clone(),
            status: CourseStatus::Completed,
            grade: Some(c.grade.clone()),
            semester: None,
            units: None,
        });
        let current = parsed.current_courses.iter().map(|code| Self {
            course_code: code.clone(),
            status: CourseStatus::Current,
            grade: None,
            semester: current_semester.clone(),
            units: None,
        });
        completed.chain(current).collect()
    }
}

impl UserCourse {
    pub async fn all_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM user_courses WHERE user_id = $1 ORDER BY status, course_code",
        )
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Swaps the user's whole course list in one transaction.
    pub async fn replace_for_user(
        mm: &ModelManager,
        user_id: Uuid,
        rows: Vec<UserCourseCreate>,
    ) -> DatabaseResult<usize> {
        let mut tx = mm.transaction().await?;
        sqlx::query("DELETE FROM user_courses WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for row in &rows {
            sqlx::query(
                "INSERT INTO user_courses (id, user_id, course_code, status, grade, semester, units) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7)",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&row.course_code)
            .bind(row.status.to_string())
            .bind(&row.grade)
            .bind(&row.semester)
            .bind(row.units)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    pub async fn delete_for_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM user_courses WHERE user_id = $1")
            .bind(user_id)
            .execute(mm.executor())
            .await?;
        Ok(result.rows_affected())
    }
}
