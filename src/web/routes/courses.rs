use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    catalog::{self, CourseInfo},
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped,
        entity::{Course, CourseCreate, Lesson},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{MessageResponse, courses::CourseWithLessons},
        error::ErrorResponse,
        middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler).post(courses_create_handler))
        .route("/page", get(courses_page_handler))
        .route("/catalog", get(catalog_list_handler))
        .route("/catalog/{code}", get(catalog_get_handler))
        .route(
            "/{course}",
            get(courses_get_handler)
                .put(courses_update_handler)
                .delete(courses_delete_handler),
        )
        .route("/{course}/lessons", get(courses_lessons_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_course(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Course> {
    let user = ctx.user()?;
    Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    description = "Lists active courses",
    responses(
        (status = 200, description = "Active courses", body = Vec<Course>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let courses = Course::list_active(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/page",
    description = "Pages through every course, inactive ones included (admin only)",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Requested page", body = crate::model::Page<Course>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_page_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.admin(Course::get_resource_type())?;
    let courses = Course::page(state.pool(), admin, page.limit, page.offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    description = "Fetches a course with its active lessons",
    params(("course_id" = Uuid, Path, description = "ID of the course")),
    responses(
        (status = 200, description = "Course found", body = CourseWithLessons),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let lessons = Lesson::all_by_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseWithLessons { course, lessons })))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/lessons",
    description = "Active lessons of a course ordered by week, then order",
    params(("course_id" = Uuid, Path, description = "ID of the course")),
    responses(
        (status = 200, description = "Lessons of the course", body = Vec<Lesson>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_lessons_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;
    let lessons = Lesson::all_by_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(lessons)))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseCreate,
    description = "Creates a course (admin only)",
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 409, description = "Course code already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.admin(Course::get_resource_type())?;
    if payload.code.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(WebError::bad_request("Course code and name are required"));
    }

    let created = Course::create(state.pool(), admin, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    tracing::info!("course {} created", created.code());

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}",
    request_body = CourseCreate,
    description = "Updates a course (admin only)",
    params(("course_id" = Uuid, Path, description = "ID of the course")),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.admin(Course::get_resource_type())?;
    let course = find_course(&state, &ctx, id).await?;

    let updated = course
        .update(state.pool(), admin, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    description = "Deletes a course with its lessons (admin only)",
    params(("course_id" = Uuid, Path, description = "ID of the course")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn courses_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.admin(Course::get_resource_type())?;
    let course = find_course(&state, &ctx, id).await?;
    let code = course.code().to_string();

    course
        .delete(state.pool(), admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    tracing::info!("course {code} deleted");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new(format!("Course {code} deleted"))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/catalog",
    description = "Every course of the static catalog with prerequisites",
    responses(
        (status = 200, description = "Catalog entries", body = Vec<CourseInfo>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn catalog_list_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let entries: Vec<CourseInfo> = catalog::all_courses().map(catalog::info).collect();
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/courses/catalog/{code}",
    description = "A single catalog entry",
    params(("code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Catalog entry", body = CourseInfo),
        (status = 404, description = "Not in the catalog", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "courses"
)]
async fn catalog_get_handler(
    ctx: RequestContext,
    Path(code): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let code = code.trim().to_uppercase();
    if !catalog::contains(&code) {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }
    Ok((StatusCode::OK, Json(catalog::info(&code))))
}
