use std::path::PathBuf;

use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_ENV, find_config_file, read_config, read_config_at};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    llm: Llm,
    #[serde(default)]
    youtube: YouTube,
    #[serde(default)]
    google: Google,
    #[serde(default)]
    crawler: Crawler,
    #[serde(default)]
    transcript: Transcript,
    #[serde(default)]
    classify: Classify,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_token_ttl_hours")]
    token_ttl_hours: i64,
    /// Root directory holding `<COURSE>/Wn` and `<COURSE>_New/Wn` folders.
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Llm {
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_llm_base_url")]
    base_url: String,
    #[serde(default = "default_llm_model")]
    model: String,
    #[serde(default = "default_llm_max_tokens")]
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct YouTube {
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_youtube_base_url")]
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Google {
    #[serde(default = "default_google_userinfo_url")]
    userinfo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Crawler {
    #[serde(default = "default_max_depth")]
    max_depth: usize,
    #[serde(default = "default_max_links_per_page")]
    max_links_per_page: usize,
    #[serde(default = "default_workers")]
    workers: usize,
    #[serde(default = "default_request_delay_ms")]
    request_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Transcript {
    #[serde(default = "default_proximity")]
    proximity: usize,
    #[serde(default = "default_current_term")]
    current_term: String,
}

#[derive(Debug, Deserialize)]
pub struct Classify {
    #[serde(default = "default_topics_dir")]
    topics_dir: PathBuf,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_llm_base_url() -> String {
    String::from("https://api.anthropic.com")
}

fn default_llm_model() -> String {
    String::from("claude-sonnet-4-20250514")
}

fn default_llm_max_tokens() -> u32 {
    4000
}

fn default_youtube_base_url() -> String {
    String::from("https://www.googleapis.com/youtube/v3")
}

fn default_google_userinfo_url() -> String {
    String::from("https://www.googleapis.com/oauth2/v2/userinfo")
}

fn default_max_depth() -> usize {
    3
}

fn default_max_links_per_page() -> usize {
    10
}

fn default_workers() -> usize {
    4
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_proximity() -> usize {
    100
}

fn default_current_term() -> String {
    String::from("fall 2025")
}

fn default_topics_dir() -> PathBuf {
    PathBuf::from("./topics")
}

impl Default for Llm {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

impl Default for YouTube {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_youtube_base_url(),
        }
    }
}

impl Default for Google {
    fn default() -> Self {
        Self {
            userinfo_url: default_google_userinfo_url(),
        }
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_links_per_page: default_max_links_per_page(),
            workers: default_workers(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            proximity: default_proximity(),
            current_term: default_current_term(),
        }
    }
}

impl Default for Classify {
    fn default() -> Self {
        Self {
            topics_dir: default_topics_dir(),
        }
    }
}

impl Config {
    /// Loaded once per process; exits when no usable config file is found.
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                Self::load(use_local).unwrap_or_else(|e| {
                    crate::error::log_error(&e);
                    tracing::error!("set {CONFIG_ENV} or create ./config.toml");
                    std::process::exit(1);
                })
            })
            .await
    }

    pub fn load(use_local: bool) -> ConfigResult<Self> {
        Self::from_toml(&read_config(use_local)?)
    }

    pub fn from_toml(bytes: &[u8]) -> ConfigResult<Self> {
        Ok(toml::from_slice(bytes)?)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn llm(&self) -> &Llm {
        &self.llm
    }

    #[inline]
    pub fn youtube(&self) -> &YouTube {
        &self.youtube
    }

    #[inline]
    pub fn google(&self) -> &Google {
        &self.google
    }

    #[inline]
    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }

    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[inline]
    pub fn classify(&self) -> &Classify {
        &self.classify
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn token_ttl_hours(&self) -> i64 {
        self.token_ttl_hours
    }

    #[inline]
    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }
}

/// Empty keys in the config file fall back to the environment.
fn key_or_env(key: &str, var: &str) -> Option<String> {
    if !key.trim().is_empty() {
        return Some(key.trim().to_string());
    }
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Llm {
    pub fn api_key(&self) -> Option<String> {
        key_or_env(&self.api_key, "ANTHROPIC_API_KEY")
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl YouTube {
    pub fn api_key(&self) -> Option<String> {
        key_or_env(&self.api_key, "YOUTUBE_API_KEY")
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Google {
    #[inline]
    pub fn userinfo_url(&self) -> &str {
        &self.userinfo_url
    }
}

impl Crawler {
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn max_links_per_page(&self) -> usize {
        self.max_links_per_page
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }

    #[inline]
    pub fn request_delay_ms(&self) -> u64 {
        self.request_delay_ms
    }
}

impl Transcript {
    #[inline]
    pub fn proximity(&self) -> usize {
        self.proximity
    }

    #[inline]
    pub fn current_term(&self) -> &str {
        &self.current_term
    }
}

impl Classify {
    #[inline]
    pub fn topics_dir(&self) -> &std::path::Path {
        &self.topics_dir
    }
}
