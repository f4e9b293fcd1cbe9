use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::homework;
use crate::model::entity::{HomeworkAssignment, HomeworkAssignmentCreate};
use crate::model::{ResourceTyped, check_access};
use crate::web::dto::homework::{HomeworkDeleted, HomeworkResponse, HomeworkUploaded};
use crate::web::error::ErrorResponse;
use crate::web::routes::read_pdf_upload;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub const UPLOAD_FIELD: &str = "file";

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{course}/homework/upload", post(homework_upload_handler))
        .route(
            "/{course}/homework",
            get(homework_get_handler).delete(homework_delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/courses/{course_code}/homework/upload",
    description = "Breaks a homework PDF into guided problems; replaces the previous upload for the course",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    request_body(content_type = "multipart/form-data", description = "Field `file` with a .pdf file"),
    responses(
        (status = 200, description = "Homework processed", body = HomeworkUploaded),
        (status = 400, description = "No file, or not a PDF", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 429, description = "Language model quota exceeded", body = ErrorResponse),
        (status = 503, description = "Language model not configured", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "homework"
)]
async fn homework_upload_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_code): Path<String>,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let upload = read_pdf_upload(multipart, UPLOAD_FIELD).await?;
    let llm = state.llm()?;

    let breakdown =
        homework::process_homework_pdf(llm.as_ref(), upload.bytes, &upload.filename).await?;
    let total = breakdown.problems.len();

    HomeworkAssignment::upsert(
        state.pool(),
        user,
        HomeworkAssignmentCreate {
            course_code,
            original_filename: upload.filename.clone(),
            breakdown: breakdown.clone(),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(HomeworkAssignment::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(HomeworkUploaded {
            success: true,
            data: breakdown,
            message: format!(
                "Successfully processed {} and generated {total} problems",
                upload.filename
            ),
        }),
    ))
}

async fn find_homework(
    state: &AppState,
    ctx: &RequestContext,
    course_code: &str,
) -> WebResult<HomeworkAssignment> {
    let user = ctx.user()?;
    let found = HomeworkAssignment::find_for_course(state.pool(), user.user_id(), course_code)
        .await
        .map_err(|e| WebError::resource_fetch_error(HomeworkAssignment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(
            HomeworkAssignment::get_resource_type(),
        ))?;

    check_access(user, &found)
        .map_err(|e| WebError::resource_fetch_error(HomeworkAssignment::get_resource_type(), e))?;
    Ok(found)
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_code}/homework",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Latest homework breakdown", body = HomeworkResponse),
        (status = 404, description = "No homework uploaded for this course", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "homework"
)]
async fn homework_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_code): Path<String>,
) -> WebResult<impl IntoResponse> {
    let found = find_homework(&state, &ctx, &course_code).await?;
    Ok((StatusCode::OK, Json(HomeworkResponse::from(found))))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_code}/homework",
    params(("course_code" = String, Path, description = "Course code, e.g. CS162")),
    responses(
        (status = 200, description = "Homework deleted", body = HomeworkDeleted),
        (status = 404, description = "No homework uploaded for this course", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "homework"
)]
async fn homework_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_code): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = find_homework(&state, &ctx, &course_code).await?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(HomeworkAssignment::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(HomeworkDeleted {
            success: true,
            message: String::from("Homework deleted successfully"),
        }),
    ))
}
