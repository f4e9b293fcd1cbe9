use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::post,
};

use crate::llm::classify::{self, TopicMatch};
use crate::web::dto::videos::{ClassifyBody, ClassifyResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

const FALLBACK_WARNING: &str = "Could not accurately classify topic, using default";

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/topic", post(classify_topic_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/classify/topic",
    request_body = ClassifyBody,
    description = "Asks the language model which of the course's topics some content belongs to",
    responses(
        (status = 200, description = "Chosen topic", body = ClassifyResponse),
        (status = 400, description = "Missing content or course code, or course has no topic list", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 429, description = "Language model quota exceeded", body = ErrorResponse),
        (status = 503, description = "Language model not configured", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "classify"
)]
async fn classify_topic_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ClassifyBody>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let (Some(content), Some(code)) = (
        payload.content.filter(|c| !c.trim().is_empty()),
        payload.course_code.filter(|c| !c.trim().is_empty()),
    ) else {
        return Err(WebError::bad_request("Content and courseCode are required"));
    };
    let code = code.trim().to_uppercase();

    let topics_dir = state.config().classify().topics_dir();
    let topics = classify::load_topics(topics_dir, &code)
        .await
        .map_err(WebError::server_io_error)?
        .filter(|topics| !topics.is_empty())
        .ok_or_else(|| {
            WebError::bad_request(format!("Topic classification is not supported for {code}"))
        })?;

    let llm = state.llm()?;
    let found = classify::classify_topic(llm.as_ref(), &code, &topics, &content).await?;

    let response = match found {
        Some(TopicMatch::Matched(topic)) => ClassifyResponse {
            topic,
            warning: None,
        },
        Some(TopicMatch::Fallback(topic)) => ClassifyResponse {
            topic,
            warning: Some(String::from(FALLBACK_WARNING)),
        },
        None => return Err(WebError::bad_request(format!("No topics listed for {code}"))),
    };

    Ok((StatusCode::OK, Json(response)))
}
