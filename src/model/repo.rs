use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

/// Largest page any listing hands out.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// What a row is, for error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Course,
    Lesson,
    Concept,
    Exercise,
    Progress,
    UserCourse,
    LessonProgress,
    Homework,
    WeekVideo,
    Transcript,
}

impl ResourceType {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Course => "course",
            Self::Lesson => "lesson",
            Self::Concept => "concept",
            Self::Exercise => "exercise",
            Self::Progress => "progress record",
            Self::UserCourse => "course record",
            Self::LessonProgress => "lesson progress",
            Self::Homework => "homework",
            Self::WeekVideo => "week video",
            Self::Transcript => "transcript",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// Clamps client supplied bounds to `1..=MAX_PAGE_LIMIT` and a
    /// non-negative offset.
    pub fn bounds(limit: i64, offset: i64) -> (i64, i64) {
        (limit.clamp(1, MAX_PAGE_LIMIT), offset.max(0))
    }

    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

/// Table access shared by every entity. `actor` is the caller; owned rows
/// check it before writes.
#[async_trait::async_trait]
pub trait CrudRepository<T, Input, Id>
where
    T: ResourceTyped,
    Id: Clone + Copy,
{
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        input: Input,
    ) -> DatabaseResult<T>;
    async fn update(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        input: Input,
    ) -> DatabaseResult<T>
    where
        Self: Sized;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Id,
    ) -> DatabaseResult<Option<T>>;
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<T>>;
    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait PaginatableRepository<T, Input, Id>
where
    T: ResourceTyped + CrudRepository<T, Input, Id>,
    Id: Clone + Copy,
{
    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<T>>;
}

#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $ent_create:ident, $ent_id:ident) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableRepository<$ent, $ent_create, $ent_id> for $ent {
            async fn page(
                mm: &ModelManager,
                actor: &AuthenticatedUser,
                limit: i64,
                offset: i64,
            ) -> DatabaseResult<$crate::model::Page<$ent>> {
                let (limit, offset) = $crate::model::Page::<$ent>::bounds(limit, offset);
                let items = $ent::list(mm, actor, limit, offset).await?;
                let count = $ent::count(mm, actor).await?;
                Ok($crate::model::Page::new(items, count, limit, offset))
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounds_are_clamped() {
        assert_eq!(Page::<()>::bounds(0, -5), (1, 0));
        assert_eq!(Page::<()>::bounds(500, 20), (MAX_PAGE_LIMIT, 20));
        assert_eq!(Page::<()>::bounds(25, 0), (25, 0));
    }

    #[test]
    fn has_more_counts_items_seen() {
        assert!(Page::new(vec![1, 2], 5, 2, 0).has_more());
        assert!(!Page::new(vec![5], 5, 2, 4).has_more());
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(ResourceType::UserCourse.to_string(), "course record");
        assert_eq!(ResourceType::Transcript.label(), "transcript");
    }
}
