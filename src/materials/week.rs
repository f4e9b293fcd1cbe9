use std::sync::LazyLock;

use regex::Regex;

use crate::materials::WEEKS;

pub const TARGET_EXTENSIONS: &[&str] = &[".pdf", ".ppt", ".pptx", ".doc", ".docx"];

pub const LECTURE_KEYWORDS: &[&str] = &[
    "lecture",
    "week",
    "class",
    "session",
    "notes",
    "slides",
    "handout",
    "material",
    "reading",
    "assignment",
    "homework",
    "lab",
    "tutorial",
    "recitation",
    "discussion",
    "review",
    "exam",
    "quiz",
    "test",
    "solution",
    "answer",
];

/// Tried in order; the first one whose first match is a valid week wins.
static WEEK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"lecture\s*(\d+)",
        r"week\s*(\d+)",
        r"class\s*(\d+)",
        r"session\s*(\d+)",
        r"day\s*(\d+)",
        r"(\d+)\s*lecture",
        r"(\d+)\s*week",
        r"(\d+)\s*class",
        r"(\d+)\s*session",
        r"(\d+)\s*day",
        r"lec(\d+)",
        r"w(\d+)",
        r"c(\d+)",
        r"s(\d+)",
        r"d(\d+)",
        r"chapter\s*(\d+)",
        r"ch(\d+)",
        r"part\s*(\d+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Week number (1 to 15) named by a link text or URL.
pub fn extract_week_number(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    WEEK_PATTERNS.iter().find_map(|re| {
        re.captures(&lower)
            .and_then(|c| c[1].parse::<u32>().ok())
            .filter(|w| WEEKS.contains(w))
    })
}

pub fn is_pdf_url(url: &str) -> bool {
    url.to_lowercase().contains("pdf")
}

/// Document links worth downloading (slides, notes, handouts).
pub fn is_target_file(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    TARGET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// A link that probably leads to lecture material: a PDF, or lecture
/// vocabulary in its text.
pub fn is_lecture_related(url: &str, text: &str) -> bool {
    if is_pdf_url(url) {
        return true;
    }
    let text = text.to_lowercase();
    LECTURE_KEYWORDS.iter().any(|k| text.contains(k))
}
