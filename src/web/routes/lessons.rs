use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::model::entity::{Concept, ConceptCreate, Exercise, ExerciseCreate, Lesson, LessonCreate};
use crate::model::ResourceTyped;
use crate::web::dto::courses::LessonDetail;
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(lessons_create_handler))
        .route("/{id}", get(lessons_get_handler))
        .route(
            "/{id}/concepts",
            get(lessons_concepts_handler).post(lessons_add_concept_handler),
        )
        .route(
            "/{id}/exercises",
            get(lessons_exercises_handler).post(lessons_add_exercise_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Inactive lessons are hidden from everyone but admins.
async fn find_lesson(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Lesson> {
    let user = ctx.user()?;
    Lesson::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .filter(|lesson| lesson.is_active() || user.is_admin())
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/lessons/{lesson_id}",
    description = "Fetches a lesson with its concepts and exercises",
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson to get")),
    responses(
        (status = 200, description = "Lesson found", body = LessonDetail),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;

    let concepts = Concept::all_by_lesson(state.pool(), lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Concept::get_resource_type(), e))?;
    let exercises = Exercise::all_by_lesson(state.pool(), lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(LessonDetail {
            lesson,
            concepts,
            exercises,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/lessons/{lesson_id}/concepts",
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson")),
    responses(
        (status = 200, description = "Concepts in lesson order", body = Vec<Concept>),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_concepts_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;
    let concepts = Concept::all_by_lesson(state.pool(), lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Concept::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(concepts)))
}

#[utoipa::path(
    get,
    path = "/api/lessons/{lesson_id}/exercises",
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson")),
    responses(
        (status = 200, description = "Exercises in lesson order", body = Vec<Exercise>),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_exercises_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let lesson = find_lesson(&state, &ctx, id).await?;
    let exercises = Exercise::all_by_lesson(state.pool(), lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(exercises)))
}

#[utoipa::path(
    post,
    path = "/api/lessons",
    request_body = LessonCreate,
    description = "Adds a lesson to a course (admin only)",
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    ctx.admin(Lesson::get_resource_type())?;
    let created = Lesson::create(state.pool(), payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/lessons/{lesson_id}/concepts",
    request_body = ConceptCreate,
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson")),
    responses(
        (status = 201, description = "Concept created", body = Concept),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_add_concept_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<ConceptCreate>,
) -> WebResult<impl IntoResponse> {
    ctx.admin(Concept::get_resource_type())?;
    let lesson = find_lesson(&state, &ctx, id).await?;
    payload.lesson_id = lesson.id();

    let created = Concept::create(state.pool(), payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Concept::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/lessons/{lesson_id}/exercises",
    request_body = ExerciseCreate,
    params(("lesson_id" = Uuid, Path, description = "ID of the lesson")),
    responses(
        (status = 201, description = "Exercise created", body = Exercise),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "lessons"
)]
async fn lessons_add_exercise_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<ExerciseCreate>,
) -> WebResult<impl IntoResponse> {
    ctx.admin(Exercise::get_resource_type())?;
    let lesson = find_lesson(&state, &ctx, id).await?;
    payload.lesson_id = lesson.id();

    let created = Exercise::create(state.pool(), payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}
