use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

mod data;
pub use data::{CATEGORIES, CatalogEntry};
use data::{COURSES, MAX_RECOMMENDED, PRIORITY_CORE, PRIORITY_SOFTWARE, PRIORITY_THEORY};

pub const UNKNOWN_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseInfo {
    pub code: String,
    pub website: String,
    pub prerequisites: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CurriculumPlan {
    pub completed_courses: Vec<String>,
    pub current_courses: Vec<String>,
    pub available_courses: Vec<String>,
    pub recommended_courses: Vec<String>,
    pub course_details: BTreeMap<String, CourseInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Recommendation {
    #[serde(flatten)]
    pub info: CourseInfo,
    pub missing_prerequisites: Vec<String>,
    pub can_take: bool,
}

fn entry(code: &str) -> Option<&'static CatalogEntry> {
    COURSES.iter().find(|c| c.code == code)
}

fn prerequisites(code: &str) -> &'static [&'static str] {
    entry(code).map(|c| c.prerequisites).unwrap_or(&[])
}

fn owned(codes: &[impl AsRef<str>]) -> HashSet<&str> {
    codes.iter().map(|c| c.as_ref()).collect()
}

pub fn contains(code: &str) -> bool {
    entry(code).is_some()
}

/// All catalog course codes in catalog order.
pub fn all_courses() -> impl Iterator<Item = &'static str> {
    COURSES.iter().map(|c| c.code)
}

pub fn category(code: &str) -> &'static str {
    entry(code).map(|c| c.category).unwrap_or(UNKNOWN_CATEGORY)
}

pub fn courses_in_category(category: &str) -> Vec<&'static str> {
    COURSES
        .iter()
        .filter(|c| c.category == category)
        .map(|c| c.code)
        .collect()
}

pub fn info(code: &str) -> CourseInfo {
    CourseInfo {
        code: code.to_string(),
        website: entry(code).map(|c| c.website).unwrap_or_default().to_string(),
        prerequisites: prerequisites(code).iter().map(|p| p.to_string()).collect(),
        category: category(code).to_string(),
    }
}

pub fn can_take<S: AsRef<str>>(code: &str, completed: &[S]) -> bool {
    let done = owned(completed);
    prerequisites(code).iter().all(|p| done.contains(p))
}

pub fn missing_prerequisites<S: AsRef<str>>(code: &str, completed: &[S]) -> Vec<String> {
    let done = owned(completed);
    prerequisites(code)
        .iter()
        .filter(|p| !done.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

/// Catalog courses not yet completed whose prerequisites are all satisfied.
pub fn available<S: AsRef<str>>(completed: &[S]) -> Vec<String> {
    let done = owned(completed);
    COURSES
        .iter()
        .filter(|c| !done.contains(c.code))
        .filter(|c| c.prerequisites.iter().all(|p| done.contains(p)))
        .map(|c| c.code.to_string())
        .collect()
}

/// Orders `available` by the priority tracks (core, theory, software), then
/// the rest in their given order, capped at ten.
pub fn recommended<S: AsRef<str>>(available: &[S]) -> Vec<String> {
    let open = owned(available);
    let mut out: Vec<String> = Vec::new();

    let priority = PRIORITY_CORE
        .iter()
        .chain(PRIORITY_THEORY)
        .chain(PRIORITY_SOFTWARE)
        .copied();
    let rest = available.iter().map(|c| c.as_ref());

    for code in priority.filter(|c| open.contains(c)).chain(rest) {
        if out.len() == MAX_RECOMMENDED {
            break;
        }
        if !out.iter().any(|c| c == code) {
            out.push(code.to_string());
        }
    }
    out
}

pub fn curriculum_plan(completed: &[String], current: &[String]) -> CurriculumPlan {
    let available: Vec<String> = available(completed)
        .into_iter()
        .filter(|c| !current.contains(c))
        .collect();

    let course_details = available
        .iter()
        .chain(current)
        .map(|code| (code.clone(), info(code)))
        .collect();

    CurriculumPlan {
        completed_courses: completed.to_vec(),
        current_courses: current.to_vec(),
        recommended_courses: recommended(&available),
        available_courses: available,
        course_details,
    }
}

pub fn recommendations(completed: &[String], current: &[String]) -> Vec<Recommendation> {
    curriculum_plan(completed, current)
        .recommended_courses
        .iter()
        .map(|code| Recommendation {
            info: info(code),
            missing_prerequisites: missing_prerequisites(code, completed),
            can_take: can_take(code, completed),
        })
        .collect()
}
