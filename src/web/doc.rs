use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

/// Registers both ways a token can be sent: the `SID` cookie set on sign-in
/// and an `Authorization: Bearer` header.
pub struct AuthSchemesModifier;

impl Modify for AuthSchemesModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "CourseMate API", description = "Course planning, progress and study material services"),
    paths(
        crate::web::routes::health_handler,
        crate::web::routes::auth::auth_signup_handler,
        crate::web::routes::auth::auth_signin_handler,
        crate::web::routes::auth::auth_google_handler,
        crate::web::routes::auth::auth_me_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_page_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::courses::courses_lessons_handler,
        crate::web::routes::courses::courses_create_handler,
        crate::web::routes::courses::courses_update_handler,
        crate::web::routes::courses::courses_delete_handler,
        crate::web::routes::courses::catalog_list_handler,
        crate::web::routes::courses::catalog_get_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_concepts_handler,
        crate::web::routes::lessons::lessons_exercises_handler,
        crate::web::routes::lessons::lessons_create_handler,
        crate::web::routes::lessons::lessons_add_concept_handler,
        crate::web::routes::lessons::lessons_add_exercise_handler,
        crate::web::routes::progress::progress_summary_handler,
        crate::web::routes::progress::progress_lesson_handler,
        crate::web::routes::progress::progress_update_handler,
        crate::web::routes::transcript::transcript_upload_handler,
        crate::web::routes::transcript::transcript_text_handler,
        crate::web::routes::transcript::transcript_existing_handler,
        crate::web::routes::transcript::transcript_clear_handler,
        crate::web::routes::transcript::transcript_curriculum_handler,
        crate::web::routes::transcript::transcript_courses_handler,
        crate::web::routes::transcript::transcript_recommendations_handler,
        crate::web::routes::lesson_progress::lesson_progress_save_handler,
        crate::web::routes::lesson_progress::lesson_progress_map_handler,
        crate::web::routes::homework::homework_upload_handler,
        crate::web::routes::homework::homework_get_handler,
        crate::web::routes::homework::homework_delete_handler,
        crate::web::routes::week_videos::week_videos_get_handler,
        crate::web::routes::week_videos::course_videos_get_handler,
        crate::web::routes::week_videos::course_videos_generate_handler,
        crate::web::routes::week_videos::week_videos_generate_handler,
        crate::web::routes::classify::classify_topic_handler,
    ),
    modifiers(&AuthSchemesModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/signup",
            "/api/courses/{course_id}",
            "/api/transcript/upload",
            "/api/week-videos/{course_code}/generate",
            "/api/classify/topic",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
        let schemes = &doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("cookie") && schemes.contains_key("bearer"));
    }
}
