//! Transcript text parser.
//!
//! Turns the raw text of a transcript PDF into completed and in-progress
//! catalog courses, grades, GPA, unit totals and the terms mentioned.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog;

mod term;
pub use term::{Season, Term, TermMatch, find_terms};

/// Grade used in place of an in-progress course's letter grade.
pub const IN_PROGRESS_MARKER: char = '—';
pub const NO_GRADE: &str = "N/A";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-.+—]").expect("valid regex"));
static COURSE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:CS|EECS|COMPSCI|PHYSICS|EE|MATH|INDENG)\s*\d+[A-Z]*\b")
        .expect("valid regex")
});
static UNITS_GRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+([A-F][+-]?|NP|P|S|U)(?:\s|$)").expect("valid regex")
});
static GRADE_POINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+").expect("valid regex"));
static PASS_FAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:pass|fail|credit)\b").expect("valid regex"));
static CURRENT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:current|in progress|enrolled|taking|this semester)").expect("valid regex")
});
static COMPLETED_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:completed|finished|taken)\b").expect("valid regex"));
static GPA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:cumulative gpa|grade point average|gpa)[:\s]*(\d+\.\d+)")
        .expect("valid regex")
});
static TOTAL_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:total units|units completed|credit hours)[:\s]*(\d+)")
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CompletedCourse {
    pub course_code: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SemesterEntry {
    pub semester: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SemesterInfo {
    pub current_semester: String,
    pub current_year: String,
    pub all_semesters: Vec<SemesterEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ParsedTranscript {
    pub completed_courses: Vec<CompletedCourse>,
    pub current_courses: Vec<String>,
    pub gpa: f64,
    pub total_units: i64,
    pub semester_info: SemesterInfo,
    pub raw_text: String,
}

impl ParsedTranscript {
    pub fn completed_codes(&self) -> Vec<String> {
        self.completed_courses
            .iter()
            .map(|c| c.course_code.clone())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Max distance in characters between a course mention and an indicator.
    pub proximity: usize,
    /// Term from which every mentioned course counts as in progress.
    pub current_term: Option<Term>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            proximity: 100,
            current_term: Some(Term::new(Season::Fall, 2025)),
        }
    }
}

impl From<&crate::config::Transcript> for ParserOptions {
    fn from(cfg: &crate::config::Transcript) -> Self {
        let current_term = cfg.current_term().parse().ok();
        if current_term.is_none() {
            tracing::warn!("unparsable transcript.current_term: {:?}", cfg.current_term());
        }
        Self {
            proximity: cfg.proximity(),
            current_term,
        }
    }
}

#[derive(Debug)]
struct Mention {
    code: String,
    start: usize,
}

#[derive(Debug, Default)]
struct CourseStatus {
    current: bool,
    completed: bool,
    grade: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    options: ParserOptions,
}

impl TranscriptParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    #[tracing::instrument(skip_all, fields(len = raw.len()))]
    pub fn parse(&self, raw: &str) -> ParsedTranscript {
        let text = clean_text(raw);
        let mentions = find_mentions(&text);
        let terms = find_terms(&text);

        let header = self
            .options
            .current_term
            .and_then(|current| terms.iter().find(|t| t.term == current))
            .map(|t| t.start);
        let current_words: Vec<usize> = CURRENT_WORDS.find_iter(&text).map(|m| m.start()).collect();
        let completed_words: Vec<usize> =
            COMPLETED_WORDS.find_iter(&text).map(|m| m.start()).collect();

        let mut order: Vec<String> = Vec::new();
        let mut status: HashMap<String, CourseStatus> = HashMap::new();

        for (i, mention) in mentions.iter().enumerate() {
            let end = mentions.get(i + 1).map(|m| m.start).unwrap_or(text.len());
            let segment = &text[mention.start..end];
            let near = |positions: &[usize]| {
                positions
                    .iter()
                    .any(|p| p.abs_diff(mention.start) < self.options.proximity)
            };
            let row_end = mention.start + grade_column(segment);
            let governing = self.governing_term(&terms, mention.start, row_end);

            let is_current = segment.contains(IN_PROGRESS_MARKER)
                || header.is_some_and(|h| mention.start > h)
                || near(&current_words)
                || matches!((governing, self.options.current_term), (Some(g), Some(c)) if g >= c);

            let grade = UNITS_GRADE
                .captures(segment)
                .map(|caps| caps[2].to_uppercase());
            let is_completed = grade.is_some()
                || GRADE_POINTS.is_match(segment)
                || PASS_FAIL.is_match(segment)
                || near(&completed_words)
                || matches!((governing, self.options.current_term), (Some(g), Some(c)) if g < c);

            let entry = status.entry(mention.code.clone()).or_insert_with(|| {
                order.push(mention.code.clone());
                CourseStatus::default()
            });
            entry.current |= is_current;
            entry.completed |= is_completed;
            if entry.grade.is_none() {
                entry.grade = grade;
            }
        }

        let mut completed_courses = Vec::new();
        let mut current_courses = Vec::new();
        for code in order {
            let Some(st) = status.remove(&code) else {
                continue;
            };
            if st.current {
                current_courses.push(code);
            } else if st.completed {
                completed_courses.push(CompletedCourse {
                    course_code: code,
                    grade: st.grade.unwrap_or_else(|| NO_GRADE.to_string()),
                });
            }
        }

        tracing::debug!(
            "transcript parsed: {} completed, {} current",
            completed_courses.len(),
            current_courses.len()
        );

        ParsedTranscript {
            completed_courses,
            current_courses,
            gpa: extract_gpa(&text),
            total_units: extract_total_units(&text),
            semester_info: semester_info(&terms),
            raw_text: raw.to_string(),
        }
    }

    /// Term governing the mention at `pos`. A term written in the mention's
    /// own row, before `row_end`, wins over the nearest preceding header.
    /// Either must lie within the proximity window.
    fn governing_term(&self, terms: &[TermMatch], pos: usize, row_end: usize) -> Option<Term> {
        let within = |t: &&TermMatch| t.start.abs_diff(pos) < self.options.proximity;
        terms
            .iter()
            .filter(|t| t.start > pos && t.end <= row_end)
            .find(within)
            .or_else(|| terms.iter().rev().filter(|t| t.start < pos).find(within))
            .map(|t| t.term)
    }
}

/// Collapses whitespace and blanks out punctuation except `-`, `.`, `+` and
/// the in-progress marker.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    SPECIAL.replace_all(&collapsed, " ").trim().to_string()
}

/// Maps a raw course token to its catalog code, if it is one.
pub fn normalize_course_code(raw: &str) -> Option<String> {
    let upper: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let code = if let Some(rest) = upper.strip_prefix("COMPSCI") {
        format!("CS{rest}")
    } else if let Some(rest) = upper.strip_prefix("PHYSICS") {
        format!("Physics{rest}")
    } else if let Some(rest) = upper.strip_prefix("MATH") {
        format!("Math{rest}")
    } else {
        upper
    };

    if catalog::contains(&code) {
        return Some(code);
    }

    // lab (L) and honors (H) sections
    if code.starts_with("CS") && (code.ends_with('L') || code.ends_with('H')) {
        let base = &code[..code.len() - 1];
        if catalog::contains(base) {
            return Some(base.to_string());
        }
    }
    None
}

/// Offset in `segment` where the grade column starts: the in-progress
/// marker, a `units grade` pair, grade points or a pass/fail keyword.
fn grade_column(segment: &str) -> usize {
    [
        segment.find(IN_PROGRESS_MARKER),
        UNITS_GRADE.find(segment).map(|m| m.start()),
        GRADE_POINTS.find(segment).map(|m| m.start()),
        PASS_FAIL.find(segment).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(segment.len())
}

fn find_mentions(text: &str) -> Vec<Mention> {
    COURSE_CODE
        .find_iter(text)
        .filter_map(|m| {
            normalize_course_code(m.as_str()).map(|code| Mention {
                code,
                start: m.start(),
            })
        })
        .collect()
}

fn extract_gpa(text: &str) -> f64 {
    GPA.captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

fn extract_total_units(text: &str) -> i64 {
    TOTAL_UNITS
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

fn semester_info(terms: &[TermMatch]) -> SemesterInfo {
    let all_semesters = terms
        .iter()
        .map(|t| SemesterEntry {
            semester: t.raw_season.clone(),
            year: t.raw_year.clone(),
        })
        .collect();

    let (current_semester, current_year) = terms
        .iter()
        .map(|t| t.term)
        .max()
        .map(|t| (t.season().as_str().to_string(), t.year().to_string()))
        .unwrap_or_default();

    SemesterInfo {
        current_semester,
        current_year,
        all_semesters,
    }
}
