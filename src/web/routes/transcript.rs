use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    catalog::{self, CurriculumPlan},
    model::{
        CrudRepository, ResourceType, ResourceTyped,
        entity::{UserCourse, UserCourseCreate, UserEntity},
    },
    pdf::{self, PdfError},
    transcript::{ParsedTranscript, ParserOptions, TranscriptParser},
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            transcript::{
                ExistingTranscript, GroupedCourses, RecommendationsResponse, TranscriptTextBody,
                TranscriptUploaded,
            },
        },
        error::ErrorResponse,
        middlewares,
        routes::read_pdf_upload,
    },
};

pub const UPLOAD_FIELD: &str = "transcript_pdf";

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/upload", post(transcript_upload_handler))
        .route("/text", post(transcript_text_handler))
        .route("/existing", get(transcript_existing_handler))
        .route("/clear", post(transcript_clear_handler))
        .route("/curriculum", get(transcript_curriculum_handler))
        .route("/courses", get(transcript_courses_handler))
        .route("/recommendations", get(transcript_recommendations_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn current_user(state: &AppState, ctx: &RequestContext) -> WebResult<UserEntity> {
    let user = ctx.user()?;
    UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))
}

/// The stored transcript, or 400 when the user never uploaded one.
fn require_transcript(user: &UserEntity) -> WebResult<ParsedTranscript> {
    user.transcript()
        .filter(|_| user.transcript_uploaded())
        .ok_or(WebError::bad_request("No transcript uploaded"))
}

/// Parses `raw`, stores the result on the user and replaces their course rows.
async fn store_transcript(
    state: &AppState,
    user: &mut UserEntity,
    raw: &str,
) -> WebResult<ParsedTranscript> {
    let parser = TranscriptParser::new(ParserOptions::from(state.config().transcript()));
    let parsed = parser.parse(raw);

    user.set_transcript(state.pool(), &parsed)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::Transcript, e))?;
    let stored = UserCourse::replace_for_user(
        state.pool(),
        user.id(),
        UserCourseCreate::from_transcript(&parsed),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserCourse::get_resource_type(), e))?;

    tracing::info!(
        "transcript stored for {}: {} course rows, gpa {:?}",
        user.id(),
        stored,
        parsed.gpa
    );
    Ok(parsed)
}

#[utoipa::path(
    post,
    path = "/api/transcript/upload",
    description = "Uploads a transcript PDF (multipart field `transcript_pdf`) and parses it",
    request_body(content_type = "multipart/form-data", description = "Field `transcript_pdf` with a .pdf file"),
    responses(
        (status = 200, description = "Transcript parsed and stored", body = TranscriptUploaded),
        (status = 400, description = "No PDF, not a PDF, or no readable text", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_upload_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    multipart: Multipart,
) -> WebResult<impl IntoResponse> {
    let mut user = current_user(&state, &ctx).await?;
    let upload = read_pdf_upload(multipart, UPLOAD_FIELD).await?;
    tracing::debug!("transcript upload {} ({} bytes)", upload.filename, upload.bytes.len());

    let raw = pdf::extract_text_blocking(upload.bytes)
        .await
        .map_err(|e| match e {
            PdfError::Empty => WebError::bad_request(
                "Could not extract text from PDF. Please ensure the PDF contains readable text.",
            ),
            PdfError::IoError(e) => WebError::server_io_error(e),
            e => WebError::bad_request(format!("Error processing PDF: {e}")),
        })?;

    let parsed = store_transcript(&state, &mut user, &raw).await?;
    Ok((
        StatusCode::OK,
        Json(TranscriptUploaded {
            message: String::from("Transcript uploaded and parsed successfully"),
            parsed_data: parsed,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/transcript/text",
    request_body = TranscriptTextBody,
    description = "Parses transcript text pasted by the user",
    responses(
        (status = 200, description = "Transcript parsed and stored", body = TranscriptUploaded),
        (status = 400, description = "Empty text", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_text_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<TranscriptTextBody>,
) -> WebResult<impl IntoResponse> {
    if payload.text.trim().is_empty() {
        return Err(WebError::bad_request("Transcript text is required"));
    }
    let mut user = current_user(&state, &ctx).await?;

    let parsed = store_transcript(&state, &mut user, &payload.text).await?;
    Ok((
        StatusCode::OK,
        Json(TranscriptUploaded {
            message: String::from("Transcript parsed successfully"),
            parsed_data: parsed,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/transcript/existing",
    responses(
        (status = 200, description = "Stored transcript", body = ExistingTranscript),
        (status = 404, description = "No transcript data found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_existing_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = current_user(&state, &ctx).await?;
    let parsed = user
        .transcript()
        .filter(|_| user.transcript_uploaded())
        .ok_or(WebError::resource_not_found(ResourceType::Transcript))?;

    Ok((
        StatusCode::OK,
        Json(ExistingTranscript {
            transcript_uploaded: true,
            parsed_data: parsed,
            uploaded_at: user.updated_at(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/transcript/clear",
    description = "Forgets the transcript and every course row derived from it",
    responses(
        (status = 200, description = "Transcript cleared", body = MessageResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_clear_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let mut user = current_user(&state, &ctx).await?;

    user.clear_transcript(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::Transcript, e))?;
    UserCourse::delete_for_user(state.pool(), user.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserCourse::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Transcript data cleared successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/transcript/curriculum",
    description = "Builds the curriculum plan from the stored transcript",
    responses(
        (status = 200, description = "Curriculum plan", body = CurriculumPlan),
        (status = 400, description = "No transcript uploaded", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_curriculum_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let mut user = current_user(&state, &ctx).await?;
    let parsed = require_transcript(&user)?;

    let plan = catalog::curriculum_plan(&parsed.completed_codes(), &parsed.current_courses);
    if !user.curriculum_generated() {
        user.mark_curriculum_generated(state.pool())
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    }

    Ok((StatusCode::OK, Json(plan)))
}

#[utoipa::path(
    get,
    path = "/api/transcript/courses",
    description = "The user's courses grouped by status with catalog info",
    responses(
        (status = 200, description = "Grouped courses", body = GroupedCourses),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = UserCourse::all_by_user(state.pool(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserCourse::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(GroupedCourses::from_rows(&rows))))
}

#[utoipa::path(
    get,
    path = "/api/transcript/recommendations",
    description = "Up to ten next courses with their missing prerequisites",
    responses(
        (status = 200, description = "Recommendations", body = RecommendationsResponse),
        (status = 400, description = "No transcript uploaded", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(("cookie" = []), ("bearer" = [])),
    tag = "transcript"
)]
async fn transcript_recommendations_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = current_user(&state, &ctx).await?;
    let parsed = require_transcript(&user)?;

    let completed_courses = parsed.completed_codes();
    let recommendations = catalog::recommendations(&completed_courses, &parsed.current_courses);

    Ok((
        StatusCode::OK,
        Json(RecommendationsResponse {
            recommendations,
            completed_courses,
            current_courses: parsed.current_courses,
        }),
    ))
}
