use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use futures::StreamExt;
use url::Url;

use crate::materials::{
    MaterialsError, MaterialsResult, html,
    week::{extract_week_number, is_lecture_related, is_pdf_url, is_target_file},
};

const PAGE_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("coursemate/", env!("CARGO_PKG_VERSION"));

/// A downloadable document found while crawling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialLink {
    pub url: Url,
    pub text: String,
}

/// Materials grouped by week number.
pub type WeekMaterials = BTreeMap<u32, Vec<MaterialLink>>;

/// Breadth-first crawler over a single course website.
pub struct Crawler {
    http_client: reqwest::Client,
    max_depth: usize,
    max_links_per_page: usize,
    workers: usize,
    visited: Mutex<HashSet<String>>,
}

impl Crawler {
    pub fn new(max_depth: usize, max_links_per_page: usize, workers: usize) -> MaterialsResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MaterialsError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            max_depth,
            max_links_per_page,
            workers: workers.max(1),
            visited: Mutex::new(HashSet::new()),
        })
    }

    pub fn from_config(cfg: &crate::config::Crawler) -> MaterialsResult<Self> {
        Self::new(cfg.max_depth(), cfg.max_links_per_page(), cfg.workers())
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Marks `url` visited; false when it already was.
    fn mark_visited(&self, url: &Url) -> bool {
        match self.visited.lock() {
            Ok(mut visited) => visited.insert(url.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(url.to_string()),
        }
    }

    fn is_visited(&self, url: &Url) -> bool {
        match self.visited.lock() {
            Ok(visited) => visited.contains(url.as_str()),
            Err(poisoned) => poisoned.into_inner().contains(url.as_str()),
        }
    }

    /// Fetches a page body; failures are logged and yield `None`.
    async fn fetch_page(&self, url: Url) -> Option<(Url, String)> {
        if !self.mark_visited(&url) {
            return None;
        }
        tracing::info!("fetching {url}");

        let response = match self.http_client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("error fetching {url}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!("error fetching {url}: status {}", response.status());
            return None;
        }
        match response.text().await {
            Ok(body) => Some((url, body)),
            Err(e) => {
                tracing::warn!("error reading {url}: {e}");
                None
            }
        }
    }

    /// Crawls from `start`, collecting PDF links that name a week.
    ///
    /// Pages on other hosts are never fetched. On each page at most
    /// `max_links_per_page` lecture-related links are followed.
    #[tracing::instrument(skip(self), fields(start = %start))]
    pub async fn crawl(&self, start: Url) -> WeekMaterials {
        let host = start.host_str().map(str::to_string);
        let mut materials = WeekMaterials::new();
        let mut collected: HashSet<String> = HashSet::new();
        let mut level = vec![start];

        for depth in 0..=self.max_depth {
            if level.is_empty() {
                break;
            }
            tracing::debug!("depth {depth}: {} pages", level.len());

            let pages: Vec<(Url, String)> = futures::stream::iter(level)
                .map(|url| self.fetch_page(url))
                .buffer_unordered(self.workers)
                .filter_map(|page| async move { page })
                .collect()
                .await;

            let mut next = Vec::new();
            for (page_url, body) in pages {
                let mut followed = 0;
                for anchor in html::anchors(&body) {
                    let Ok(mut url) = page_url.join(&anchor.href) else {
                        continue;
                    };
                    if !matches!(url.scheme(), "http" | "https") {
                        continue;
                    }
                    url.set_fragment(None);

                    if is_pdf_url(url.as_str()) {
                        let week = extract_week_number(&anchor.text)
                            .or_else(|| extract_week_number(url.as_str()));
                        if let Some(week) = week
                            && collected.insert(url.to_string())
                        {
                            materials.entry(week).or_default().push(MaterialLink {
                                url,
                                text: anchor.text,
                            });
                        }
                        continue;
                    }

                    let follow = depth < self.max_depth
                        && followed < self.max_links_per_page
                        && url.host_str().map(str::to_string) == host
                        && !is_target_file(url.as_str())
                        && is_lecture_related(url.as_str(), &anchor.text)
                        && !self.is_visited(&url)
                        && !next.contains(&url);
                    if follow {
                        followed += 1;
                        next.push(url);
                    }
                }
            }
            level = next;
        }

        tracing::info!(
            "found materials for {} weeks ({} files)",
            materials.len(),
            collected.len()
        );
        materials
    }
}
