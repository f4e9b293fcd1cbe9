//! Homework breakdowns: a PDF goes to the language model, the markdown answer
//! is parsed into problems, parts and guiding questions.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::llm::{CompletionRequest, LanguageModel, LlmResult, prompts};

pub const DEFAULT_TITLE: &str = "Homework Assignment";

static PROBLEM_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*## Problem \d+:").expect("valid regex"));
static TITLE_POINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\((\d+)\s*points?\)").expect("valid regex"));
static PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#### Part \((\w+)\):\s*(.+)").expect("valid regex"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.*)").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LearningNotes {
    pub core_concepts: Vec<String>,
    pub key_tradeoffs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProblemPart {
    pub letter: String,
    pub description: String,
    pub key_information: Vec<String>,
    pub leading_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Problem {
    pub number: u32,
    pub title: String,
    pub points: u32,
    pub learning_notes: LearningNotes,
    pub parts: Vec<ProblemPart>,
    pub check_understanding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HomeworkMetadata {
    pub source_file: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_problems: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HomeworkBreakdown {
    pub title: String,
    pub problems: Vec<Problem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HomeworkMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListTarget {
    None,
    CoreConcepts,
    KeyTradeoffs,
    KeyInformation,
    LeadingQuestions,
}

#[tracing::instrument(skip(llm, pdf))]
pub async fn process_homework_pdf(
    llm: &dyn LanguageModel,
    pdf: Vec<u8>,
    filename: &str,
) -> LlmResult<HomeworkBreakdown> {
    tracing::info!("processing homework pdf ({} bytes)", pdf.len());
    let markdown = llm
        .complete(CompletionRequest::pdf_with_text(pdf, prompts::HOMEWORK_BREAKDOWN))
        .await?;

    let mut breakdown = parse_breakdown(&markdown);
    breakdown.metadata = Some(HomeworkMetadata {
        source_file: filename.to_string(),
        uploaded_at: Utc::now(),
        total_problems: breakdown.problems.len(),
    });
    Ok(breakdown)
}

pub fn parse_breakdown(markdown: &str) -> HomeworkBreakdown {
    let title = markdown
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let problems = PROBLEM_SPLIT
        .split(markdown)
        .skip(1)
        .zip(1..)
        .map(|(section, number)| parse_problem(section, number))
        .collect();

    HomeworkBreakdown {
        title,
        problems,
        metadata: None,
    }
}

fn parse_problem(section: &str, number: u32) -> Problem {
    let mut lines = section.trim().lines();
    let title_line = lines.next().unwrap_or_default().trim();

    let (title, points) = match TITLE_POINTS.captures(title_line) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].parse().unwrap_or(0)),
        None => (title_line.to_string(), 0),
    };

    let mut problem = Problem {
        number,
        title,
        points,
        learning_notes: LearningNotes::default(),
        parts: Vec::new(),
        check_understanding: String::new(),
    };

    let mut part: Option<ProblemPart> = None;
    let mut target = ListTarget::None;
    let mut in_check = false;
    let mut check: Vec<&str> = Vec::new();

    for line in lines.map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("## Check Your Understanding") {
            in_check = true;
            target = ListTarget::None;
            continue;
        }
        if in_check {
            check.push(line);
            continue;
        }

        if line.starts_with("### ") {
            target = ListTarget::None;
            continue;
        }
        if line.starts_with("**Core Concepts:**") {
            target = ListTarget::CoreConcepts;
            continue;
        }
        if line.starts_with("**Key Tradeoffs:**") {
            target = ListTarget::KeyTradeoffs;
            continue;
        }
        if line.starts_with("#### Part (") {
            problem.parts.extend(part.take());
            part = PART.captures(line).map(|caps| ProblemPart {
                letter: caps[1].to_string(),
                description: caps[2].trim().to_string(),
                key_information: Vec::new(),
                leading_questions: Vec::new(),
            });
            target = ListTarget::None;
            continue;
        }
        if line.starts_with("**Key Information:**") {
            target = ListTarget::KeyInformation;
            continue;
        }
        if line.starts_with("**Leading Questions:**") {
            target = ListTarget::LeadingQuestions;
            continue;
        }

        let item = match line.strip_prefix("- ") {
            Some(rest) => rest.trim(),
            None => match NUMBERED.captures(line) {
                Some(caps) => caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default(),
                None => continue,
            },
        };

        let list = match (target, part.as_mut()) {
            (ListTarget::CoreConcepts, _) => &mut problem.learning_notes.core_concepts,
            (ListTarget::KeyTradeoffs, _) => &mut problem.learning_notes.key_tradeoffs,
            (ListTarget::KeyInformation, Some(p)) => &mut p.key_information,
            (ListTarget::LeadingQuestions, Some(p)) => &mut p.leading_questions,
            _ => continue,
        };
        list.push(item.to_string());
    }

    problem.parts.extend(part);
    problem.check_understanding = check.join(" ");
    problem
}

#[cfg(test)]
mod test {
    use super::*;

    const BREAKDOWN: &str = "\
# Problem Set 3: Binary Trees

## Problem 1: Tree Traversal (10 points)

### Learning Notes

**Core Concepts:**
- Inorder traversal visits left, root, right
- Recursion depth equals tree height

**Key Tradeoffs:**
- Recursive vs iterative traversal

### Problem Breakdown

#### Part (a): Write an inorder traversal
**Key Information:**
- Tree may be empty

**Leading Questions:**
1. What is the base case?
2. Which subtree comes first?
3. How deep can the recursion get?

#### Part (b): Count the leaves
**Key Information:**
- A leaf has no children

**Leading Questions:**
1. How do you detect a leaf?
2. How do you combine subtree counts?
3. What does an empty tree return?

## Problem 2: Balanced Trees

#### Part (a): Define balance
**Key Information:**
- Heights differ by at most one

## Check Your Understanding

How would you adapt the traversal
to a tree with parent pointers?
";

    #[test]
    fn parses_problems_and_parts() {
        let hw = parse_breakdown(BREAKDOWN);
        assert_eq!(hw.title, "Problem Set 3: Binary Trees");
        assert_eq!(hw.problems.len(), 2);

        let p1 = &hw.problems[0];
        assert_eq!(p1.number, 1);
        assert_eq!(p1.title, "Tree Traversal");
        assert_eq!(p1.points, 10);
        assert_eq!(p1.learning_notes.core_concepts.len(), 2);
        assert_eq!(
            p1.learning_notes.key_tradeoffs,
            vec!["Recursive vs iterative traversal"]
        );
        assert_eq!(p1.parts.len(), 2);
        assert_eq!(p1.parts[0].letter, "a");
        assert_eq!(p1.parts[0].description, "Write an inorder traversal");
        assert_eq!(p1.parts[0].key_information, vec!["Tree may be empty"]);
        assert_eq!(p1.parts[1].leading_questions.len(), 3);
        assert_eq!(p1.parts[1].leading_questions[2], "What does an empty tree return?");
        assert!(p1.check_understanding.is_empty());

        let p2 = &hw.problems[1];
        assert_eq!(p2.title, "Balanced Trees");
        assert_eq!(p2.points, 0);
        assert_eq!(p2.parts.len(), 1);
        assert_eq!(
            p2.check_understanding,
            "How would you adapt the traversal to a tree with parent pointers?"
        );
    }

    #[test]
    fn missing_title_falls_back() {
        let hw = parse_breakdown("## Problem 1: Only (5 points)\n");
        assert_eq!(hw.title, DEFAULT_TITLE);
        assert_eq!(hw.problems.len(), 1);
        assert_eq!(hw.problems[0].points, 5);
    }

    #[test]
    fn no_problems() {
        let hw = parse_breakdown("just some prose");
        assert_eq!(hw.title, DEFAULT_TITLE);
        assert!(hw.problems.is_empty());
    }
}
