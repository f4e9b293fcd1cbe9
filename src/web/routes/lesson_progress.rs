//! Progress on the generated weekly lessons, keyed by course code and the
//! front-end's lesson id rather than a `lessons` row.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::model::entity::{LessonProgress, LessonProgressUpdate};
use crate::model::ResourceTyped;
use crate::web::dto::progress::{
    LessonProgressBody, LessonProgressEntry, LessonProgressMap, LessonProgressSaved,
};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{course}/lessons/progress", get(lesson_progress_map_handler))
        .route(
            "/{course}/lessons/{lesson_id}/progress",
            post(lesson_progress_save_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/courses/{course_code}/lessons/{lesson_id}/progress",
    request_body = LessonProgressBody,
    params(
        ("course_code" = String, Path, description = "Course code, e.g. CS162"),
        ("lesson_id" = String, Path, description = "Lesson identifier within the course"),
    ),
    responses(
        (status = 200, description = "Progress saved", body = LessonProgressSaved),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lesson-progress"
)]
async fn lesson_progress_save_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((course_code, lesson_id)): Path<(String, String)>,
    Json(payload): Json<LessonProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let update = LessonProgressUpdate {
        course_code,
        lesson_id,
        completed: payload.completed,
        progress: payload.progress,
    };

    let progress = LessonProgress::upsert(state.pool(), user, update)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(LessonProgressSaved {
            message: String::from("Progress updated successfully"),
            progress,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_code}/lessons/progress",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Progress keyed by lesson id", body = LessonProgressMap),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lesson-progress"
)]
async fn lesson_progress_map_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_code): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = LessonProgress::all_by_course(state.pool(), user.user_id(), &course_code)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let progress = rows
        .iter()
        .map(|row| (row.lesson_id().to_string(), LessonProgressEntry::from(row)))
        .collect();

    Ok((StatusCode::OK, Json(LessonProgressMap { progress })))
}
