use std::sync::LazyLock;

use regex::Regex;

const MAX_TOPICS: usize = 10;
const QUERY_TOPICS: usize = 5;
const MAX_QUERIES: usize = 10;
const DEFAULT_SUBJECT: &str = "computer science";

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{2,3}\s+(.+)$").expect("valid regex"));
static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"→\s*([^→\n]+)").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-.]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn course_subject(course_code: &str) -> &'static str {
    match course_code {
        "CS162" => "operating systems",
        "CS170" => "algorithms",
        "CS61A" => "programming python",
        "CS61B" => "data structures",
        "EECS126" => "probability random processes",
        "EECS16A" | "EECS16B" => "linear algebra circuits",
        _ => DEFAULT_SUBJECT,
    }
}

fn clean_topic(raw: &str) -> String {
    let stripped = SPECIAL.replace_all(raw.trim(), "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Candidate search topics from a study guide: section headers, arrow
/// concepts, bold terms and quoted terms, in that order.
pub fn extract_topics(study_guide: &str) -> Vec<String> {
    let captured = |re: &Regex| -> Vec<String> {
        re.captures_iter(study_guide)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect()
    };

    let mut topics: Vec<String> = Vec::new();
    let candidates = [&HEADER, &ARROW, &BOLD, &QUOTED]
        .into_iter()
        .flat_map(|re| captured(&**re));

    for raw in candidates {
        let topic = clean_topic(&raw);
        let len = topic.chars().count();
        if (3..=100).contains(&len) && !topics.contains(&topic) {
            topics.push(topic);
        }
        if topics.len() == MAX_TOPICS {
            break;
        }
    }
    topics
}

/// Up to ten queries built from the first five topics: the bare topic, the
/// topic with the course subject, the topic with `tutorial explanation`.
pub fn search_queries(topics: &[String], course_code: &str) -> Vec<String> {
    let subject = course_subject(course_code);
    topics
        .iter()
        .take(QUERY_TOPICS)
        .flat_map(|t| {
            [
                t.clone(),
                format!("{t} {subject}"),
                format!("{t} tutorial explanation"),
            ]
        })
        .take(MAX_QUERIES)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const GUIDE: &str = r#"# Week 3 Study Guide

## Virtual Memory
Processes see an address space → page tables map it
### Page Tables (multi-level)
- **TLB** caches translations
- A "page fault" traps into the kernel
## Virtual Memory
- **ok**
"#;

    #[test]
    fn extracts_in_order_without_duplicates() {
        let topics = extract_topics(GUIDE);
        assert_eq!(
            topics,
            vec![
                "Virtual Memory",
                "Page Tables multi-level",
                "page tables map it",
                "TLB",
                "page fault",
            ]
        );
    }

    #[test]
    fn caps_topics() {
        let guide: String = (0..30).map(|i| format!("## Topic number {i}\n")).collect();
        assert_eq!(extract_topics(&guide).len(), 10);
    }

    #[test]
    fn queries_use_course_subject() {
        let topics = vec!["Paging".to_string(), "Threads".to_string()];
        let queries = search_queries(&topics, "CS162");
        assert_eq!(
            queries,
            vec![
                "Paging",
                "Paging operating systems",
                "Paging tutorial explanation",
                "Threads",
                "Threads operating systems",
                "Threads tutorial explanation",
            ]
        );

        let many: Vec<String> = (0..8).map(|i| format!("t{i}")).collect();
        let queries = search_queries(&many, "CS999");
        assert_eq!(queries.len(), 10);
        assert_eq!(queries[1], "t0 computer science");
    }
}
