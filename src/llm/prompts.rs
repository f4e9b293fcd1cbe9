//! Prompt templates.

pub fn study_guide(course_code: &str, week: u32, content: &str) -> String {
    format!(
        r#"You are an educational content assistant. I will provide you with content extracted from PDFs for {course_code} Week {week}. Your task is to create **Khan Academy-style study notes**.

Requirements:

1. Organize the content into **clear sections and subsections** using headings (##, ###).
2. Summarize text into **short, digestible bullet points**.
3. Include **markdown tables only if they are relevant** to the concept being explained. Do not insert unrelated tables.
4. Ignore any images for now.
5. Include a small "Key Points" summary at the end of each major section.
6. Keep explanations **concise, educational, and easy to follow**, like Khan Academy notes.
7. Focus on the core concepts and learning objectives for this week.

Here is the content:
{content}
"#
    )
}

pub const HOMEWORK_BREAKDOWN: &str = r#"Break down the following homework assignment (algorithms/CS domain) into structured learning materials. Emphasize the problem-solving process: identifying key information and asking guiding questions.

Use this EXACT markdown format:

# Problem Set [Number]: [Title]

## Problem 1: [Title] ([Points] points)

### Learning Notes

**Core Concepts:**
- [Concept 1 with explanation]
- [Concept 2 with explanation]

**Key Tradeoffs:**
- [Tradeoff 1 with explanation]
- [Tradeoff 2 with explanation]

### Problem Breakdown

#### Part (a): [Description]
**Key Information:**
- [Constraint 1]
- [Constraint 2]

**Leading Questions:**
1. [Question 1 guiding thought process]
2. [Question 2 guiding toward candidate approaches]
3. [Question 3 testing correctness/efficiency intuition]

#### Part (b): [Description]
**Key Information:**
- [Constraint 1]
- [Constraint 2]

**Leading Questions:**
1. [Question 1]
2. [Question 2]
3. [Question 3]

## Check Your Understanding

[Conceptual or extension questions testing whether the student can generalize the approach]

Constraints:

Every problem part must include both Key Information and exactly 3 Leading Questions.

Keep explanations concise and problem-solving oriented.

Do not provide final solutions unless explicitly required.
"#;

pub const CLASSIFY_MAX_TOKENS: u32 = 100;

pub fn classify_topic(course_code: &str, topics: &[String], content: &str) -> String {
    let listing = topics
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Given this {course_code} lesson content and the following list of topics, identify which SINGLE topic this lesson primarily covers.

Available topics:
{listing}

Lesson content:
{content}

Instructions:
- Analyze the lesson content carefully
- Identify the main topic that this lesson is teaching
- Respond with ONLY the exact topic name from the list above that best matches this lesson content
- If no topic matches well, respond with the closest match
- Do not include any explanation, just the topic name

Topic:"#
    )
}
