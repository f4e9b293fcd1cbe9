use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::materials::{STUDY_GUIDE_FILE, week_dirs};
use crate::model::DatabaseResult;
use crate::videos::{
    EducationalSearch, VideoCandidate, VideoResult, VideoSearch, extract_topics,
    search::sort_by_relevance, search_queries,
};

const TOPIC_WORDS: usize = 4;

/// Where generated week videos end up.
#[async_trait::async_trait]
pub trait WeekVideoSink: Send + Sync {
    /// Replaces the stored videos of one course week, returns how many were
    /// kept.
    async fn replace_week(
        &self,
        course_code: &str,
        week_number: i32,
        videos: &[VideoCandidate],
    ) -> DatabaseResult<usize>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseVideoReport {
    pub total_weeks: usize,
    pub processed_weeks: usize,
    pub total_videos: usize,
    pub errors: Vec<String>,
    pub quota_exceeded: bool,
}

/// Stored topic of a video: the first four words of its title.
pub fn topic_for_title(title: &str) -> String {
    title
        .split_whitespace()
        .take(TOPIC_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper bound for `max_videos` accepted from clients.
pub const MAX_VIDEOS_LIMIT: usize = 50;

/// Finds the `max_videos` most relevant videos for a week's study guide.
///
/// A quota error ends the search early; it is returned only when nothing was
/// collected before it.
#[tracing::instrument(skip(api, study_guide))]
pub async fn find_videos_for_week(
    api: &dyn VideoSearch,
    course_code: &str,
    study_guide: &str,
    max_videos: usize,
) -> VideoResult<Vec<VideoCandidate>> {
    let topics = extract_topics(study_guide);
    if topics.is_empty() {
        tracing::info!("no topics found in study guide");
        return Ok(Vec::new());
    }

    let queries = search_queries(&topics, course_code);
    tracing::debug!("{} topics, {} queries", topics.len(), queries.len());

    let search = EducationalSearch::new(api);
    let limit = max_videos.saturating_mul(2);
    let mut videos: Vec<VideoCandidate> = Vec::new();

    'queries: for query in &queries {
        let results = match search.search_all_channels(query, 1).await {
            Ok(results) => results,
            Err(e) if e.is_quota() => {
                tracing::warn!("quota exceeded while searching {query:?}, stopping");
                if videos.is_empty() {
                    return Err(e);
                }
                break;
            }
            Err(e) => {
                tracing::warn!("search for {query:?} failed: {e}");
                continue;
            }
        };

        for video in results {
            if videos.iter().any(|v| v.video_id == video.video_id) {
                continue;
            }
            videos.push(video);
            if videos.len() >= limit {
                break 'queries;
            }
        }
    }

    sort_by_relevance(&mut videos);
    videos.truncate(max_videos);
    Ok(videos)
}

/// Generates and stores videos for every week of a course folder.
#[tracing::instrument(skip(api, sink))]
pub async fn process_course_weeks(
    api: &dyn VideoSearch,
    sink: &dyn WeekVideoSink,
    course_code: &str,
    course_path: &Path,
    max_videos_per_week: usize,
) -> CourseVideoReport {
    let mut report = CourseVideoReport::default();

    let weeks = match week_dirs(course_path) {
        Ok(weeks) => weeks,
        Err(e) => {
            let msg = format!("Course path unreadable: {} ({e})", course_path.display());
            tracing::warn!("{msg}");
            report.errors.push(msg);
            return report;
        }
    };
    report.total_weeks = weeks.len();
    tracing::info!("found {} weeks for {course_code}", weeks.len());

    for (week, dir) in weeks {
        let guide_path = dir.join(STUDY_GUIDE_FILE);
        let guide = match tokio::fs::read_to_string(&guide_path).await {
            Ok(guide) => guide,
            Err(_) => {
                report
                    .errors
                    .push(format!("Study guide not found: {}", guide_path.display()));
                continue;
            }
        };

        let videos = match find_videos_for_week(api, course_code, &guide, max_videos_per_week).await
        {
            Ok(videos) => videos,
            Err(e) if e.is_quota() => {
                tracing::warn!("quota exceeded at week {week}, stopping");
                report
                    .errors
                    .push(format!("API quota exceeded - stopped at week {week}"));
                report.quota_exceeded = true;
                break;
            }
            Err(e) => {
                report
                    .errors
                    .push(format!("Error processing week {week}: {e}"));
                continue;
            }
        };

        if videos.is_empty() {
            report.errors.push(format!("No videos found for week {week}"));
            continue;
        }

        match sink.replace_week(course_code, week as i32, &videos).await {
            Ok(saved) => {
                report.processed_weeks += 1;
                report.total_videos += saved;
                tracing::info!("week {week}: {saved} videos");
            }
            Err(e) => {
                crate::error::log_error(&e);
                report
                    .errors
                    .push(format!("Failed to save videos for week {week}"));
            }
        }
    }

    report
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::videos::search::test::{FakeVideos, item};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        weeks: Mutex<Vec<(String, i32, Vec<String>)>>,
    }

    #[async_trait::async_trait]
    impl WeekVideoSink for MemorySink {
        async fn replace_week(
            &self,
            course_code: &str,
            week_number: i32,
            videos: &[VideoCandidate],
        ) -> DatabaseResult<usize> {
            let mut weeks = self.weeks.lock().unwrap();
            weeks.retain(|(c, w, _)| !(c == course_code && *w == week_number));
            let ids = videos.iter().map(|v| v.video_id.clone()).collect();
            weeks.push((course_code.to_string(), week_number, ids));
            Ok(videos.len())
        }
    }

    fn paging_fake() -> FakeVideos {
        let mut fake = FakeVideos::default();
        fake.by_query.insert(
            "Paging".into(),
            vec![item("p1", "Paging in depth", ""), item("p2", "Paging basics", "")],
        );
        fake.by_query.insert(
            "Paging operating systems".into(),
            vec![
                item("p1", "Paging in depth", ""),
                item("p3", "Operating systems paging", "paging"),
            ],
        );
        fake
    }

    #[tokio::test]
    async fn huge_limit_keeps_everything() {
        let fake = paging_fake();
        let videos = find_videos_for_week(&fake, "CS162", "## Paging\n", usize::MAX)
            .await
            .unwrap();
        assert_eq!(videos.len(), 3);
    }

    #[test]
    fn topic_is_first_four_words() {
        assert_eq!(topic_for_title("One two three four five"), "One two three four");
        assert_eq!(topic_for_title("Short title"), "Short title");
    }

    #[tokio::test]
    async fn dedups_and_limits() {
        let fake = paging_fake();
        let videos = find_videos_for_week(&fake, "CS162", "## Paging\n", 2)
            .await
            .unwrap();

        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "p3");
        assert!(ids.iter().all(|id| ["p1", "p2", "p3"].contains(id)));
    }

    #[tokio::test]
    async fn empty_guide_has_no_videos() {
        let fake = FakeVideos::default();
        let videos = find_videos_for_week(&fake, "CS162", "", 3).await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn quota_before_any_result_is_an_error() {
        let fake = FakeVideos {
            quota_after: Some(0),
            ..Default::default()
        };
        let err = find_videos_for_week(&fake, "CS162", "## Paging\n", 3)
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn processes_weeks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for week in ["W1", "W2", "W10"] {
            std::fs::create_dir(dir.path().join(week)).unwrap();
        }
        std::fs::create_dir(dir.path().join("notes")).unwrap();
        std::fs::write(dir.path().join("W1").join(STUDY_GUIDE_FILE), "## Paging\n").unwrap();
        std::fs::write(dir.path().join("W10").join(STUDY_GUIDE_FILE), "## Nothing\n").unwrap();

        let fake = paging_fake();
        let sink = MemorySink::default();
        let report = process_course_weeks(&fake, &sink, "CS162", dir.path(), 3).await;

        assert_eq!(report.total_weeks, 3);
        assert_eq!(report.processed_weeks, 1);
        assert_eq!(report.total_videos, 3);
        assert!(!report.quota_exceeded);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("Study guide not found"));
        assert_eq!(report.errors[1], "No videos found for week 10");

        let weeks = sink.weeks.lock().unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].1, 1);
    }

    #[tokio::test]
    async fn quota_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        for week in ["W1", "W2"] {
            std::fs::create_dir(dir.path().join(week)).unwrap();
            std::fs::write(dir.path().join(week).join(STUDY_GUIDE_FILE), "## Paging\n").unwrap();
        }

        let fake = FakeVideos {
            quota_after: Some(0),
            ..paging_fake()
        };
        let sink = MemorySink::default();
        let report = process_course_weeks(&fake, &sink, "CS162", dir.path(), 3).await;

        assert!(report.quota_exceeded);
        assert_eq!(report.processed_weeks, 0);
        assert_eq!(report.errors, vec!["API quota exceeded - stopped at week 1"]);
    }
}
