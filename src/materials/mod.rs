//! Course material layout and downloader.
//!
//! Raw lecture files live in `<data_dir>/<COURSE>/W<n>`, generated study
//! material in `<data_dir>/<COURSE>_New/W<n>`.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub mod crawler;
pub mod download;
pub mod html;
pub mod week;

pub use crawler::{Crawler, MaterialLink, WeekMaterials};
pub use download::download_week;
pub use week::extract_week_number;

pub const WEEKS: RangeInclusive<u32> = 1..=15;
pub const GENERATED_SUFFIX: &str = "_New";
pub const STUDY_GUIDE_FILE: &str = "study_guide.md";
pub const METADATA_FILE: &str = "metadata.json";
const DIFFICULTY: &str = "intermediate";
const ESTIMATED_TIME: &str = "60 minutes";

#[derive(Debug, Error)]
pub enum MaterialsError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("invalid course website {0}: {1}")]
    InvalidUrl(String, url::ParseError),
}

pub type MaterialsResult<T> = std::result::Result<T, MaterialsError>;

/// `metadata.json` next to every generated study guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekMetadata {
    pub week: u32,
    pub course: String,
    pub title: String,
    pub description: String,
    pub topics: Vec<String>,
    pub difficulty: String,
    pub estimated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_files: Option<Vec<String>>,
}

impl WeekMetadata {
    pub fn placeholder(course_code: &str, week: u32) -> Self {
        Self {
            week,
            course: course_code.to_string(),
            title: format!("Week {week} Materials"),
            description: format!("Lecture materials for {course_code} Week {week}"),
            topics: Vec::new(),
            difficulty: DIFFICULTY.to_string(),
            estimated_time: ESTIMATED_TIME.to_string(),
            pdf_count: None,
            pdf_files: None,
        }
    }

    pub fn generated(course_code: &str, week: u32, pdf_files: Vec<String>) -> Self {
        Self {
            title: format!("Week {week} Study Guide"),
            description: format!("Study guide for {course_code} Week {week}"),
            pdf_count: Some(pdf_files.len()),
            pdf_files: Some(pdf_files),
            ..Self::placeholder(course_code, week)
        }
    }

    pub async fn write(&self, path: &Path) -> MaterialsResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[inline]
pub fn course_dir(data_dir: &Path, course_code: &str) -> PathBuf {
    data_dir.join(course_code)
}

#[inline]
pub fn generated_dir(data_dir: &Path, course_code: &str) -> PathBuf {
    data_dir.join(format!("{course_code}{GENERATED_SUFFIX}"))
}

#[inline]
pub fn week_dir_name(week: u32) -> String {
    format!("W{week}")
}

/// Week directories (`W<n>`) of a course folder in numeric order.
pub fn week_dirs(course_path: &Path) -> std::io::Result<Vec<(u32, PathBuf)>> {
    let mut weeks = Vec::new();
    for entry in std::fs::read_dir(course_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(week) = name
            .to_str()
            .and_then(|n| n.strip_prefix('W'))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        weeks.push((week, entry.path()));
    }
    weeks.sort_by_key(|(week, _)| *week);
    Ok(weeks)
}

/// Creates `<COURSE>/W1..W15` and `<COURSE>_New/W1..W15`.
pub async fn create_course_dirs(data_dir: &Path, course_code: &str) -> MaterialsResult<()> {
    let raw = course_dir(data_dir, course_code);
    let generated = generated_dir(data_dir, course_code);
    for week in WEEKS {
        tokio::fs::create_dir_all(raw.join(week_dir_name(week))).await?;
        tokio::fs::create_dir_all(generated.join(week_dir_name(week))).await?;
    }
    tracing::debug!("created directory structure for {course_code}");
    Ok(())
}

fn placeholder_study_guide(course_code: &str, week: u32) -> String {
    format!(
        "# Week {week} Study Guide\n\n\
         ## Key Concepts\n\n\
         - Placeholder content for {course_code} Week {week}\n\
         - This will be populated after running PDF extraction\n\n\
         ## Examples and Explanations\n\n\
         - Detailed examples will be added here\n\
         - Step-by-step explanations will be provided\n"
    )
}

/// Writes the placeholder guide and metadata into a generated week folder
/// unless they already exist. Returns how many files were written.
pub async fn write_placeholders(
    data_dir: &Path,
    course_code: &str,
    week: u32,
) -> MaterialsResult<usize> {
    let dir = generated_dir(data_dir, course_code).join(week_dir_name(week));
    tokio::fs::create_dir_all(&dir).await?;
    let mut written = 0;

    let guide = dir.join(STUDY_GUIDE_FILE);
    if !tokio::fs::try_exists(&guide).await? {
        tokio::fs::write(&guide, placeholder_study_guide(course_code, week)).await?;
        written += 1;
    }

    let metadata = dir.join(METADATA_FILE);
    if !tokio::fs::try_exists(&metadata).await? {
        WeekMetadata::placeholder(course_code, week)
            .write(&metadata)
            .await?;
        written += 1;
    }

    Ok(written)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadReport {
    pub weeks_found: usize,
    pub files_downloaded: usize,
    pub placeholders_written: usize,
}

/// Crawls a catalog course's website and fills `<COURSE>/W<n>` with PDFs.
#[tracing::instrument(skip(data_dir, crawler_cfg))]
pub async fn download_course_materials(
    course_code: &str,
    data_dir: &Path,
    crawler_cfg: &crate::config::Crawler,
) -> MaterialsResult<DownloadReport> {
    if !crate::catalog::contains(course_code) {
        return Err(MaterialsError::UnknownCourse(course_code.to_string()));
    }
    let entry = crate::catalog::info(course_code);
    let start = Url::parse(&entry.website)
        .map_err(|e| MaterialsError::InvalidUrl(entry.website.clone(), e))?;

    let crawler = Crawler::from_config(crawler_cfg)?;
    download_from(
        &crawler,
        start,
        course_code,
        data_dir,
        Duration::from_millis(crawler_cfg.request_delay_ms()),
    )
    .await
}

/// Bootstraps the folders, crawls from `start` and downloads every week
/// found; weeks without material still get placeholders.
pub async fn download_from(
    crawler: &Crawler,
    start: Url,
    course_code: &str,
    data_dir: &Path,
    delay: Duration,
) -> MaterialsResult<DownloadReport> {
    tracing::info!("downloading materials for {course_code} from {start}");
    create_course_dirs(data_dir, course_code).await?;

    let materials = crawler.crawl(start).await;
    if materials.is_empty() {
        tracing::warn!("no pdf materials found for {course_code}");
    }

    let mut report = DownloadReport {
        weeks_found: materials.len(),
        ..Default::default()
    };
    let raw = course_dir(data_dir, course_code);
    for (week, links) in &materials {
        let week_dir = raw.join(week_dir_name(*week));
        let written = download_week(crawler.client(), &week_dir, links, delay).await?;
        report.files_downloaded += written.len();
    }

    for week in WEEKS {
        report.placeholders_written += write_placeholders(data_dir, course_code, week).await?;
    }

    tracing::info!(
        "download completed for {course_code}: {} files",
        report.files_downloaded
    );
    Ok(report)
}
