//! Persistence: the Postgres pool, the repository traits every table
//! implements, and the entities themselves.

mod access;
pub use access::{HasOwner, check_access};

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

mod repo;
pub use repo::{
    CrudRepository, MAX_PAGE_LIMIT, Page, PaginatableRepository, ResourceType, ResourceTyped,
};

use sqlx::{PgPool, Postgres, Transaction};

/// Shared handle passed to every repository call.
#[derive(Debug, Clone)]
pub struct ModelManager {
    database: DbConnection,
}

impl ModelManager {
    pub fn new(database: DbConnection) -> Self {
        Self { database }
    }

    pub fn executor(&self) -> &PgPool {
        self.database.pool()
    }

    /// Starts a transaction for writes that replace a whole set of rows.
    pub async fn transaction(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        Ok(self.database.pool().begin().await?)
    }
}
