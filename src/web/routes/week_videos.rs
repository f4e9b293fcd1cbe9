use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::model::entity::WeekVideo;
use crate::model::ResourceTyped;
use crate::videos;
use crate::web::dto::videos::{
    CourseVideosResponse, DEFAULT_MAX_VIDEOS, GenerateCourseBody, GenerateCourseResponse,
    GenerateWeekBody, GenerateWeekResponse, NoVideosResponse, QuotaExceededResponse,
    WeekVideosResponse,
};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

const QUOTA_MESSAGE: &str = "YouTube API quota exceeded. Please try again later.";

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{code}/weeks/{week}/videos", get(week_videos_get_handler))
        .route("/{code}/weeks/{week}/generate", post(week_videos_generate_handler))
        .route("/{code}/videos", get(course_videos_get_handler))
        .route("/{code}/generate", post(course_videos_generate_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn quota_exceeded() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(QuotaExceededResponse {
            success: false,
            error: String::from(QUOTA_MESSAGE),
            quota_exceeded: true,
        }),
    )
        .into_response()
}

/// Requested videos per week, defaulted and bounded to `1..=MAX_VIDEOS_LIMIT`.
fn video_limit(requested: Option<usize>, field: &str) -> WebResult<usize> {
    match requested.unwrap_or(DEFAULT_MAX_VIDEOS) {
        n @ 1..=videos::MAX_VIDEOS_LIMIT => Ok(n),
        _ => Err(WebError::bad_request(format!(
            "{field} must be between 1 and {}",
            videos::MAX_VIDEOS_LIMIT
        ))),
    }
}

/// A client supplied path that must already exist on the server.
async fn existing_path(raw: Option<String>, field: &str, missing: &str) -> WebResult<PathBuf> {
    let raw = raw
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| WebError::bad_request(format!("{field} is required")))?;

    let path = PathBuf::from(&raw);
    match tokio::fs::try_exists(&path).await {
        Ok(true) => Ok(path),
        Ok(false) => Err(WebError::bad_request(format!("{missing} does not exist: {raw}"))),
        Err(e) => Err(WebError::server_io_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/week-videos/{course_code}/weeks/{week_number}/videos",
    params(
        ("course_code" = String, Path, description = "Course code, e.g. CS162"),
        ("week_number" = i32, Path, description = "Week number"),
    ),
    responses(
        (status = 200, description = "Videos of the week, most relevant first", body = WeekVideosResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "week-videos"
)]
async fn week_videos_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((code, week)): Path<(String, i32)>,
) -> WebResult<Response> {
    ctx.user()?;
    let code = code.to_uppercase();
    let videos = WeekVideo::by_week(state.pool(), &code, week)
        .await
        .map_err(|e| WebError::resource_fetch_error(WeekVideo::get_resource_type(), e))?;

    if videos.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(NoVideosResponse {
                message: format!("No videos found for {code} Week {week}"),
                videos,
            }),
        )
            .into_response());
    }

    Ok((
        StatusCode::OK,
        Json(WeekVideosResponse {
            course_code: code,
            week_number: week,
            videos,
        }),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/week-videos/{course_code}/videos",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Videos grouped by week", body = CourseVideosResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "week-videos"
)]
async fn course_videos_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let code = code.to_uppercase();
    let videos = WeekVideo::by_course(state.pool(), &code)
        .await
        .map_err(|e| WebError::resource_fetch_error(WeekVideo::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseVideosResponse::new(code, videos))))
}

#[utoipa::path(
    post,
    path = "/api/week-videos/{course_code}/generate",
    request_body = GenerateCourseBody,
    description = "Finds and stores videos for every week folder under `course_path`",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Generation report", body = GenerateCourseResponse),
        (status = 400, description = "Missing or nonexistent course path, or max_videos_per_week out of range", body = ErrorResponse),
        (status = 429, description = "Video search quota exceeded", body = GenerateCourseResponse),
        (status = 503, description = "Video search not configured", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "week-videos"
)]
async fn course_videos_generate_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<GenerateCourseBody>,
) -> WebResult<Response> {
    ctx.user()?;
    let code = code.to_uppercase();
    let max = video_limit(payload.max_videos_per_week, "max_videos_per_week")?;
    let course_path = existing_path(payload.course_path, "course_path", "Course path").await?;
    let api = state.videos()?;

    let report =
        videos::process_course_weeks(api.as_ref(), state.pool(), &code, &course_path, max).await;

    if report.quota_exceeded {
        let response = GenerateCourseResponse {
            success: false,
            course_code: code,
            message: String::from(QUOTA_MESSAGE),
            results: report,
            quota_exceeded: true,
        };
        return Ok((StatusCode::TOO_MANY_REQUESTS, Json(response)).into_response());
    }

    let message = format!(
        "Generated {} videos for {} weeks",
        report.total_videos, report.processed_weeks
    );
    Ok((
        StatusCode::OK,
        Json(GenerateCourseResponse {
            success: true,
            course_code: code,
            results: report,
            message,
            quota_exceeded: false,
        }),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/week-videos/{course_code}/weeks/{week_number}/generate",
    request_body = GenerateWeekBody,
    description = "Finds and stores videos for a single week from its study guide",
    params(
        ("course_code" = String, Path, description = "Course code, e.g. CS162"),
        ("week_number" = i32, Path, description = "Week number"),
    ),
    responses(
        (status = 200, description = "Videos stored", body = GenerateWeekResponse),
        (status = 400, description = "Missing or nonexistent study guide, or max_videos out of range", body = ErrorResponse),
        (status = 429, description = "Video search quota exceeded", body = QuotaExceededResponse),
        (status = 503, description = "Video search not configured", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "week-videos"
)]
async fn week_videos_generate_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((code, week)): Path<(String, i32)>,
    Json(payload): Json<GenerateWeekBody>,
) -> WebResult<Response> {
    ctx.user()?;
    let code = code.to_uppercase();
    let max = video_limit(payload.max_videos, "max_videos")?;
    let guide_path =
        existing_path(payload.study_guide_path, "study_guide_path", "Study guide").await?;
    let api = state.videos()?;

    let guide = tokio::fs::read_to_string(&guide_path)
        .await
        .map_err(WebError::server_io_error)?;

    let found = match videos::find_videos_for_week(api.as_ref(), &code, &guide, max).await {
        Ok(found) => found,
        Err(e) if e.is_quota() => return Ok(quota_exceeded()),
        Err(e) => return Err(e.into()),
    };

    if found.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(NoVideosResponse {
                message: format!("No relevant videos found for {code} Week {week}"),
                videos: Vec::new(),
            }),
        )
            .into_response());
    }

    let saved = WeekVideo::replace_week(state.pool(), &code, week, &found)
        .await
        .map_err(|e| WebError::resource_fetch_error(WeekVideo::get_resource_type(), e))?;
    tracing::info!("{code} week {week}: stored {saved} of {} videos", found.len());

    Ok((
        StatusCode::OK,
        Json(GenerateWeekResponse {
            success: true,
            course_code: code,
            week_number: week,
            message: format!("Generated and saved {saved} videos for Week {week}"),
            videos: found,
        }),
    )
        .into_response())
}
