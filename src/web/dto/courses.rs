use serde::Serialize;

use crate::model::entity::{Concept, Course, Exercise, Lesson};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseWithLessons {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub concepts: Vec<Concept>,
    pub exercises: Vec<Exercise>,
}
