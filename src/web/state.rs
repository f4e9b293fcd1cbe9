use crate::{
    Config,
    auth::SharedGoogleVerifier,
    llm::SharedLanguageModel,
    model::ModelManager,
    videos::SharedVideoSearch,
    web::{WebError, WebResult},
};

/// Shared handler state. The hosted services are optional: a missing API key
/// disables the routes that need them with a 503.
#[derive(Clone)]
pub struct AppState {
    mm: ModelManager,
    config: &'static Config,
    llm: Option<SharedLanguageModel>,
    videos: Option<SharedVideoSearch>,
    google: SharedGoogleVerifier,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("mm", &self.mm)
            .field("llm", &self.llm.is_some())
            .field("videos", &self.videos.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new(
        mm: ModelManager,
        config: &'static Config,
        llm: Option<SharedLanguageModel>,
        videos: Option<SharedVideoSearch>,
        google: SharedGoogleVerifier,
    ) -> Self {
        Self {
            mm,
            config,
            llm,
            videos,
            google,
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }

    pub fn llm(&self) -> WebResult<&SharedLanguageModel> {
        self.llm
            .as_ref()
            .ok_or(WebError::service_unavailable("language model"))
    }

    pub fn videos(&self) -> WebResult<&SharedVideoSearch> {
        self.videos
            .as_ref()
            .ok_or(WebError::service_unavailable("video search"))
    }

    pub fn google(&self) -> &SharedGoogleVerifier {
        &self.google
    }
}
