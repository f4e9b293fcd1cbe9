use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::model::entity::{Lesson, Progress, ProgressUpdate, overall_percentage};
use crate::model::ResourceTyped;
use crate::web::dto::progress::ProgressSummary;
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_summary_handler))
        .route("/lesson/{id}", get(progress_lesson_handler))
        .route("/update", post(progress_update_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/progress",
    description = "Overall completion across active lessons plus every progress record",
    responses(
        (status = 200, description = "Progress summary", body = ProgressSummary),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "progress"
)]
async fn progress_summary_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let map_err = |e| WebError::resource_fetch_error(Progress::get_resource_type(), e);

    let progress_records = Progress::all_by_user(state.pool(), user.user_id())
        .await
        .map_err(map_err)?;
    let completed_lessons = Progress::completed_lessons(state.pool(), user.user_id())
        .await
        .map_err(map_err)?;
    let total_lessons = Lesson::count_active(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProgressSummary {
            overall_progress: overall_percentage(completed_lessons, total_lessons),
            completed_lessons,
            total_lessons,
            progress_records,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/progress/lesson/{lesson_id}",
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson")),
    responses(
        (status = 200, description = "Records of the caller on this lesson", body = Vec<Progress>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "progress"
)]
async fn progress_lesson_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let records = Progress::all_by_user_lesson(state.pool(), user.user_id(), lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Progress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(records)))
}

#[utoipa::path(
    post,
    path = "/api/progress/update",
    request_body = ProgressUpdate,
    description = "Upserts progress for a lesson, concept or exercise",
    responses(
        (status = 200, description = "Stored record", body = Progress),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "progress"
)]
async fn progress_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProgressUpdate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let exists = Lesson::find_by_id(state.pool(), payload.lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .is_some();
    if !exists {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    }

    let stored = Progress::upsert(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Progress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(stored)))
}
