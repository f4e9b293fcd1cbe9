use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::videos::{VideoCandidate, WeekVideoSink, topic_for_title};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct WeekVideo {
    id: Uuid,
    course_code: String,
    week_number: i32,
    topic: String,
    video_id: String,
    title: String,
    description: String,
    channel: String,
    url: String,
    thumbnail: String,
    duration: String,
    duration_seconds: i32,
    relevance_score: f64,
    published_at: String,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for WeekVideo {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::WeekVideo
    }
}

impl WeekVideo {
    pub fn week_number(&self) -> i32 {
        self.week_number
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }
}

/// Returns whether a row was written; duplicates of (course, week, topic)
/// are silently kept as they are.
async fn insert_video(
    tx: &mut sqlx::PgConnection,
    course_code: &str,
    week_number: i32,
    v: &VideoCandidate,
) -> DatabaseResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO week_videos
            (id, course_code, week_number, topic, video_id, title, description, channel,
             url, thumbnail, duration, duration_seconds, relevance_score, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (course_code, week_number, topic) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(course_code)
    .bind(week_number)
    .bind(topic_for_title(&v.title))
    .bind(&v.video_id)
    .bind(&v.title)
    .bind(&v.description)
    .bind(&v.channel)
    .bind(&v.url)
    .bind(&v.thumbnail)
    .bind(&v.duration)
    .bind(v.duration_seconds)
    .bind(v.relevance_score)
    .bind(&v.published_at)
    .execute(&mut *tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

impl WeekVideo {
    /// Videos of one week, most relevant first.
    pub async fn by_week(
        mm: &ModelManager,
        course_code: &str,
        week_number: i32,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM week_videos WHERE course_code = $1 AND week_number = $2 \
             ORDER BY relevance_score DESC",
        )
        .bind(course_code)
        .bind(week_number)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn by_course(mm: &ModelManager, course_code: &str) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM week_videos WHERE course_code = $1 \
             ORDER BY week_number, relevance_score DESC",
        )
        .bind(course_code)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Deletes the week's videos and inserts `videos` in one transaction.
    /// Returns how many rows were kept after topic de-duplication.
    pub async fn replace_week(
        mm: &ModelManager,
        course_code: &str,
        week_number: i32,
        videos: &[VideoCandidate],
    ) -> DatabaseResult<usize> {
        let mut tx = mm.transaction().await?;
        sqlx::query("DELETE FROM week_videos WHERE course_code = $1 AND week_number = $2")
            .bind(course_code)
            .bind(week_number)
            .execute(&mut *tx)
            .await?;

        let mut saved = 0;
        for video in videos {
            if insert_video(&mut tx, course_code, week_number, video).await? {
                saved += 1;
            }
        }
        tx.commit().await?;
        Ok(saved)
    }
}

#[async_trait]
impl WeekVideoSink for ModelManager {
    async fn replace_week(
        &self,
        course_code: &str,
        week_number: i32,
        videos: &[VideoCandidate],
    ) -> DatabaseResult<usize> {
        WeekVideo::replace_week(self, course_code, week_number, videos).await
    }
}
