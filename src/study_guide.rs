//! Study guide generation: lecture PDFs of a week are turned into text,
//! summarized by the language model and written next to the week's
//! generated material.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::llm::{CompletionRequest, LanguageModel, LlmError, prompts};
use crate::materials::{
    METADATA_FILE, MaterialsError, STUDY_GUIDE_FILE, WeekMetadata, course_dir, generated_dir,
    week_dir_name, week_dirs,
};

#[derive(Debug, Error)]
pub enum GuideError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("materials error: {0}")]
    Materials(#[from] MaterialsError),
    #[error("language model error: {0}")]
    Llm(#[from] LlmError),
}

pub type GuideResult<T> = std::result::Result<T, GuideError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuideReport {
    pub total_weeks: usize,
    pub generated: Vec<u32>,
    pub skipped: Vec<u32>,
    pub quota_exceeded: bool,
}

/// PDFs of a week folder, sorted by name.
pub async fn week_pdfs(week_dir: &Path) -> GuideResult<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    let mut entries = tokio::fs::read_dir(week_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(crate::pdf::is_pdf_filename);
        if is_pdf && entry.file_type().await?.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One `# PDF: <stem>` section per document.
pub fn combine_sections(sections: &[(String, String)]) -> String {
    sections
        .iter()
        .map(|(name, text)| format!("# PDF: {name}\n\n{}\n", text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts and combines the text of a week's PDFs. Unreadable files are
/// logged and left out.
pub async fn week_text(pdfs: &[PathBuf]) -> String {
    let mut sections = Vec::new();
    for path in pdfs {
        match crate::pdf::extract_file_blocking(path).await {
            Ok(text) => sections.push((stem(path), text)),
            Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
        }
    }
    combine_sections(&sections)
}

/// Asks the model for a week's guide and writes `study_guide.md` plus
/// `metadata.json` into `out_dir`.
pub async fn write_week_guide(
    llm: &dyn LanguageModel,
    course_code: &str,
    week: u32,
    content: &str,
    pdf_files: Vec<String>,
    out_dir: &Path,
) -> GuideResult<()> {
    let guide = llm
        .complete(CompletionRequest::text(prompts::study_guide(course_code, week, content)))
        .await?;

    tokio::fs::create_dir_all(out_dir).await?;
    tokio::fs::write(out_dir.join(STUDY_GUIDE_FILE), guide).await?;
    WeekMetadata::generated(course_code, week, pdf_files)
        .write(&out_dir.join(METADATA_FILE))
        .await?;
    Ok(())
}

/// Generates a study guide for every week folder of a course that has
/// readable PDFs. Model failures skip the week; a quota error ends the run.
#[tracing::instrument(skip(llm, data_dir))]
pub async fn generate_course_guides(
    llm: &dyn LanguageModel,
    data_dir: &Path,
    course_code: &str,
) -> GuideResult<GuideReport> {
    let weeks = week_dirs(&course_dir(data_dir, course_code))?;
    let out_root = generated_dir(data_dir, course_code);
    let mut report = GuideReport {
        total_weeks: weeks.len(),
        ..Default::default()
    };

    for (week, dir) in weeks {
        let pdfs = week_pdfs(&dir).await?;
        if pdfs.is_empty() {
            tracing::debug!("no pdfs in week {week}");
            report.skipped.push(week);
            continue;
        }

        let content = week_text(&pdfs).await;
        if content.trim().is_empty() {
            tracing::warn!("no text extracted for week {week}");
            report.skipped.push(week);
            continue;
        }

        let pdf_files = pdfs
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        let out_dir = out_root.join(week_dir_name(week));
        tracing::info!("generating study guide for {course_code} week {week}");

        match write_week_guide(llm, course_code, week, &content, pdf_files, &out_dir).await {
            Ok(()) => report.generated.push(week),
            Err(GuideError::Llm(e)) if e.is_quota() => {
                tracing::warn!("quota exceeded at week {week}, stopping");
                report.quota_exceeded = true;
                break;
            }
            Err(GuideError::Llm(e)) => {
                crate::error::log_error(&e);
                report.skipped.push(week);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "generated {} study guides for {course_code}",
        report.generated.len()
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::llm::test::ScriptedModel;

    #[test]
    fn sections_are_headed_by_pdf_name() {
        let combined = combine_sections(&[
            ("lec01".into(), "Threads\n".into()),
            ("lec02".into(), "  Locks ".into()),
        ]);
        assert_eq!(combined, "# PDF: lec01\n\nThreads\n\n# PDF: lec02\n\nLocks\n");
    }

    #[tokio::test]
    async fn writes_guide_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let llm = ScriptedModel::new(vec![Ok("## Threads\n- share memory".into())]);

        write_week_guide(&llm, "CS162", 3, "threads", vec!["lec05.pdf".into()], dir.path())
            .await
            .unwrap();

        let guide = std::fs::read_to_string(dir.path().join(STUDY_GUIDE_FILE)).unwrap();
        assert_eq!(guide, "## Threads\n- share memory");
        let metadata: WeekMetadata =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap())
                .unwrap();
        assert_eq!(metadata.title, "Week 3 Study Guide");
        assert_eq!(metadata.description, "Study guide for CS162 Week 3");
        assert_eq!(metadata.pdf_count, Some(1));

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("CS162 Week 3"));
        assert!(prompts[0].ends_with("threads\n"));
    }

    #[tokio::test]
    async fn quota_is_reported_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let llm = ScriptedModel::new(vec![Err(LlmError::QuotaExceeded("limit".into()))]);

        let err = write_week_guide(&llm, "CS162", 1, "x", Vec::new(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::Llm(e) if e.is_quota()));
        assert!(!dir.path().join(STUDY_GUIDE_FILE).exists());
    }

    #[tokio::test]
    async fn weeks_without_pdfs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        crate::materials::create_course_dirs(dir.path(), "CS170").await.unwrap();
        std::fs::write(dir.path().join("CS170/W2/notes.txt"), "not a pdf").unwrap();

        let llm = ScriptedModel::default();
        let report = generate_course_guides(&llm, dir.path(), "CS170").await.unwrap();

        assert_eq!(report.total_weeks, 15);
        assert!(report.generated.is_empty());
        assert_eq!(report.skipped, (1..=15).collect::<Vec<_>>());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_pdfs_leave_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let week = dir.path().join("W1");
        std::fs::create_dir(&week).unwrap();
        std::fs::write(week.join("b.pdf"), "garbage").unwrap();
        std::fs::write(week.join("a.PDF"), "garbage").unwrap();

        let pdfs = week_pdfs(&week).await.unwrap();
        assert_eq!(pdfs, vec![week.join("a.PDF"), week.join("b.pdf")]);
        assert!(week_text(&pdfs).await.is_empty());
    }
}
