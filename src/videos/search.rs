use std::sync::LazyLock;

use regex::Regex;

use crate::videos::{SearchItem, VideoCandidate, VideoResult, VideoSearch, watch_url};

/// (name, channel id) of the channels searched first.
pub const EDUCATIONAL_CHANNELS: &[(&str, &str)] = &[
    ("Khan Academy", "UC4a-Gbdw7vOaccHmFo40b9g"),
    ("3Blue1Brown", "UCYO_jab_esuFRV4b17AJtAw"),
    ("MIT OpenCourseWare", "UCEBb1b_L6zDS3xTUrIALZOw"),
    ("Crash Course", "UCX6b17PVsYBQ0ip5gyeme-Q"),
    ("Veritasium", "UCHnyfMqiRRG1u-2MsSQLbXA"),
];

pub const MAX_DURATION_SECS: u32 = 20 * 60;
const DESCRIPTION_LIMIT: usize = 200;
const GENERAL_RESULTS: u32 = 3;
const GENERAL_BOOST: f64 = 0.1;
/// Best channel score at or below which general results are mixed in.
const LOW_RELEVANCE: f64 = 1.0;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("valid regex")
});

/// Seconds in an ISO-8601 `PT#H#M#S` duration. Durations too large for a
/// `u32` saturate to `u32::MAX`.
pub fn parse_duration(duration: &str) -> Option<u32> {
    let caps = ISO_DURATION.captures(duration)?;
    let part = |i: usize, unit: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<u32>().ok()?.checked_mul(unit),
            None => Some(0),
        }
    };
    let total = [(1, 3600), (2, 60), (3, 1)]
        .into_iter()
        .try_fold(0u32, |acc, (i, unit)| acc.checked_add(part(i, unit)?));
    Some(total.unwrap_or(u32::MAX))
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let head: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

/// Three points per keyword found in the title, one per keyword in the
/// description.
pub fn relevance_score(title: &str, description: &str, keywords: &[String]) -> f64 {
    let title = title.to_lowercase();
    let description = description.to_lowercase();
    keywords
        .iter()
        .map(|k| {
            let mut score = 0.0;
            if title.contains(k.as_str()) {
                score += 3.0;
            }
            if description.contains(k.as_str()) {
                score += 1.0;
            }
            score
        })
        .sum()
}

pub struct EducationalSearch<'a> {
    api: &'a dyn VideoSearch,
}

impl<'a> EducationalSearch<'a> {
    pub fn new(api: &'a dyn VideoSearch) -> Self {
        Self { api }
    }

    /// Searches every educational channel; falls back to a general search
    /// when nothing scores above [`LOW_RELEVANCE`]. Quota errors abort, other
    /// failures skip the channel or video.
    #[tracing::instrument(skip(self))]
    pub async fn search_all_channels(
        &self,
        query: &str,
        per_channel: u32,
    ) -> VideoResult<Vec<VideoCandidate>> {
        let keywords: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
        let mut results = Vec::new();

        for &(name, channel_id) in EDUCATIONAL_CHANNELS {
            let items = match self.api.search(query, Some(channel_id), per_channel).await {
                Ok(items) => items,
                Err(e) if e.is_quota() => return Err(e),
                Err(e) => {
                    tracing::warn!("search in channel {name} failed: {e}");
                    continue;
                }
            };
            for item in items {
                if let Some(candidate) = self.candidate(item, Some(name), &keywords, 0.0).await? {
                    results.push(candidate);
                }
            }
        }

        sort_by_relevance(&mut results);
        let best = results.first().map(|r| r.relevance_score);
        if best.is_none_or(|score| score <= LOW_RELEVANCE) {
            tracing::debug!("low relevance for {query:?}, searching general results");
            let items = match self.api.search(query, None, GENERAL_RESULTS).await {
                Ok(items) => items,
                Err(e) if e.is_quota() => return Err(e),
                Err(e) => {
                    tracing::warn!("general search failed: {e}");
                    Vec::new()
                }
            };
            for item in items {
                if let Some(candidate) = self.candidate(item, None, &keywords, GENERAL_BOOST).await? {
                    results.push(candidate);
                }
            }
        }

        Ok(results)
    }

    /// Looks up the duration and scores the item; `None` when the video is
    /// too long or its details are unavailable.
    async fn candidate(
        &self,
        item: SearchItem,
        channel: Option<&str>,
        keywords: &[String],
        boost: f64,
    ) -> VideoResult<Option<VideoCandidate>> {
        let details = match self.api.details(&item.video_id).await {
            Ok(Some(details)) => details,
            Ok(None) => return Ok(None),
            Err(e) if e.is_quota() => return Err(e),
            Err(e) => {
                tracing::warn!("details for {} failed: {e}", item.video_id);
                return Ok(None);
            }
        };

        let Some(duration_seconds) = parse_duration(&details.duration) else {
            tracing::debug!("unparsable duration {:?} for {}", details.duration, item.video_id);
            return Ok(None);
        };
        if duration_seconds > MAX_DURATION_SECS {
            return Ok(None);
        }

        Ok(Some(VideoCandidate {
            channel: channel.map(String::from).unwrap_or(item.channel_title),
            relevance_score: relevance_score(&item.title, &item.description, keywords) + boost,
            description: truncate_description(&item.description),
            url: watch_url(&item.video_id),
            title: item.title,
            video_id: item.video_id,
            thumbnail: item.thumbnail_url,
            published_at: item.published_at,
            duration: details.duration,
            duration_seconds: duration_seconds as i32,
        }))
    }
}

pub(crate) fn sort_by_relevance(videos: &mut [VideoCandidate]) {
    videos.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::videos::{VideoDetails, VideoError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory video API keyed by query.
    #[derive(Default)]
    pub struct FakeVideos {
        pub by_query: HashMap<String, Vec<SearchItem>>,
        pub general: Vec<SearchItem>,
        pub durations: HashMap<String, String>,
        pub quota_after: Option<usize>,
        pub calls: Mutex<usize>,
    }

    pub fn item(id: &str, title: &str, description: &str) -> SearchItem {
        SearchItem {
            video_id: id.into(),
            title: title.into(),
            description: description.into(),
            channel_title: "Someone".into(),
            ..Default::default()
        }
    }

    #[async_trait::async_trait]
    impl VideoSearch for FakeVideos {
        async fn search(
            &self,
            query: &str,
            channel_id: Option<&str>,
            _max_results: u32,
        ) -> VideoResult<Vec<SearchItem>> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if self.quota_after.is_some_and(|n| *calls > n) {
                return Err(VideoError::QuotaExceeded("daily limit".into()));
            }
            // only the first channel answers, so results are not repeated
            match channel_id {
                Some(id) if id == EDUCATIONAL_CHANNELS[0].1 => {
                    Ok(self.by_query.get(query).cloned().unwrap_or_default())
                }
                Some(_) => Ok(Vec::new()),
                None => Ok(self.general.clone()),
            }
        }

        async fn details(&self, video_id: &str) -> VideoResult<Option<VideoDetails>> {
            Ok(Some(VideoDetails {
                video_id: video_id.to_string(),
                duration: self
                    .durations
                    .get(video_id)
                    .cloned()
                    .unwrap_or_else(|| "PT5M".to_string()),
            }))
        }
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT4M13S"), Some(253));
        assert_eq!(parse_duration("PT1H"), Some(3600));
        assert_eq!(parse_duration("PT45S"), Some(45));
        assert_eq!(parse_duration("P1D"), None);
    }

    #[test]
    fn oversized_durations_saturate() {
        assert_eq!(parse_duration("PT1193047H"), Some(u32::MAX));
        assert_eq!(parse_duration("PT4294967295M"), Some(u32::MAX));
        assert_eq!(parse_duration("PT99999999999S"), Some(u32::MAX));
        assert_eq!(parse_duration("PT1193046H"), Some(4_294_965_600));
        assert!(parse_duration("PT1193047H").unwrap() > MAX_DURATION_SECS);
    }

    #[test]
    fn scoring() {
        let keywords = vec!["paging".to_string(), "memory".to_string()];
        assert_eq!(relevance_score("Paging explained", "virtual memory", &keywords), 4.0);
        assert_eq!(relevance_score("Paging and Memory", "paging memory", &keywords), 8.0);
        assert_eq!(relevance_score("Cats", "dogs", &keywords), 0.0);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "a".repeat(250);
        let short = truncate_description(&long);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_description("short"), "short");
    }

    #[tokio::test]
    async fn filters_long_videos_and_sorts() {
        let mut fake = FakeVideos::default();
        fake.by_query.insert(
            "paging".into(),
            vec![
                item("a", "Intro", "paging basics"),
                item("b", "Paging deep dive", ""),
                item("c", "Paging lecture", ""),
            ],
        );
        fake.durations.insert("c".into(), "PT1H2M".into());

        let results = EducationalSearch::new(&fake)
            .search_all_channels("paging", 2)
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(results[0].channel, "Khan Academy");
        assert_eq!(results[0].url, "https://www.youtube.com/watch?v=b");
    }

    #[tokio::test]
    async fn low_relevance_adds_general_results() {
        let mut fake = FakeVideos::default();
        fake.by_query
            .insert("scheduling".into(), vec![item("a", "Unrelated", "scheduling")]);
        fake.general = vec![item("g", "Scheduling", "")];

        let results = EducationalSearch::new(&fake)
            .search_all_channels("scheduling", 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].video_id, "g");
        assert_eq!(results[1].channel, "Someone");
        assert!((results[1].relevance_score - 3.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn quota_is_propagated() {
        let fake = FakeVideos {
            quota_after: Some(0),
            ..Default::default()
        };
        let err = EducationalSearch::new(&fake)
            .search_all_channels("x", 1)
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }
}
