use crate::impl_paginatable_for;
use crate::model::access::{HasOwner, check_access};
use crate::model::repo::ResourceTyped;
use crate::transcript::ParsedTranscript;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    email: String,
    name: String,
    image_url: Option<String>,
    #[serde(skip)]
    google_id: Option<String>,
    #[serde(skip)]
    password_hash: Option<String>,
    role: String,
    transcript_uploaded: bool,
    #[serde(skip)]
    transcript_data: Option<serde_json::Value>,
    curriculum_generated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreateUpdate {
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
    pub google_id: Option<String>,
    pub password_hash: Option<String>,
}

/// Google account as confirmed by the userinfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub google_id: String,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn google_id(&self) -> Option<&str> {
        self.google_id.as_deref()
    }

    /// `None` for accounts that only ever signed in through OAuth.
    pub fn hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn transcript_uploaded(&self) -> bool {
        self.transcript_uploaded
    }

    pub fn curriculum_generated(&self) -> bool {
        self.curriculum_generated
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The stored transcript, if one was uploaded and still parses.
    pub fn transcript(&self) -> Option<ParsedTranscript> {
        let data = self.transcript_data.as_ref()?;
        match serde_json::from_value(data.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("stored transcript of {} is unreadable: {e}", self.id);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            "INSERT INTO users (id, email, name, image_url, google_id, password_hash, role) \
             VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.image_url)
        .bind(&data.google_id)
        .bind(&data.password_hash)
        .bind(UserRole::User.to_string())
        .fetch_one(mm.executor())
        .await?;
        Ok(user)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query(
            "UPDATE users SET email = $1, name = $2, image_url = $3, \
             google_id = COALESCE($4, google_id), password_hash = COALESCE($5, password_hash), \
             updated_at = NOW() WHERE id = $6 RETURNING updated_at",
        )
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.image_url)
        .bind(&data.google_id)
        .bind(&data.password_hash)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.updated_at = row.try_get("updated_at")?;
        self.email = data.email;
        self.name = data.name;
        self.image_url = data.image_url;
        if data.google_id.is_some() {
            self.google_id = data.google_id;
        }
        if data.password_hash.is_some() {
            self.password_hash = data.password_hash;
        }
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()> {
        check_access(actor, &self)?;
        sqlx::query("DELETE FROM users WHERE id = $1")
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
        let found = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(found)
    }

    /// Admins see every account, everyone else only their own.
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM users WHERE ($1 OR id = $2) ORDER BY created_at LIMIT $3 OFFSET $4",
        )
        .bind(actor.is_admin())
        .bind(actor.user_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1 OR id = $2)")
            .bind(actor.is_admin())
            .bind(actor.user_id())
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreateUpdate, Uuid);

impl HasOwner for UserEntity {
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

impl UserEntity {
    pub async fn find_by_email(mm: &ModelManager, email: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Creates the user on first Google sign-in, otherwise refreshes name and
    /// picture of the account linked to the same Google id.
    ///
    /// `None` when the email already belongs to an account that is not
    /// linked to this Google id, has a password, or is an admin.
    pub async fn upsert_google(
        mm: &ModelManager,
        profile: GoogleProfile,
    ) -> DatabaseResult<Option<Self>> {
        let user = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, name, image_url, google_id, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            WHERE users.google_id = EXCLUDED.google_id
                AND users.password_hash IS NULL
                AND users.role <> $7
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.image)
        .bind(&profile.google_id)
        .bind(UserRole::User.to_string())
        .bind(UserRole::Admin.to_string())
        .fetch_optional(mm.executor())
        .await?;
        Ok(user)
    }

    pub async fn set_transcript(
        &mut self,
        mm: &ModelManager,
        parsed: &ParsedTranscript,
    ) -> DatabaseResult<()> {
        let data = serde_json::to_value(parsed)?;
        let row = sqlx::query(
            "UPDATE users SET transcript_uploaded = TRUE, transcript_data = $1, \
             updated_at = NOW() WHERE id = $2 RETURNING updated_at",
        )
        .bind(&data)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.updated_at = row.try_get("updated_at")?;
        self.transcript_uploaded = true;
        self.transcript_data = Some(data);
        Ok(())
    }

    pub async fn clear_transcript(&mut self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE users SET transcript_uploaded = FALSE, transcript_data = NULL, \
             curriculum_generated = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.transcript_uploaded = false;
        self.transcript_data = None;
        self.curriculum_generated = false;
        Ok(())
    }

    pub async fn mark_curriculum_generated(&mut self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("UPDATE users SET curriculum_generated = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        self.curriculum_generated = true;
        Ok(())
    }

    /// Promotes an account, used by the CLI to bootstrap admins.
    pub async fn set_role(&mut self, mm: &ModelManager, role: UserRole) -> DatabaseResult<()> {
        let role = role.to_string();
        sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
            .bind(&role)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        self.role = role;
        Ok(())
    }
}
