mod common;
use coursemate::model::entity::{Course, Lesson};
use coursemate::web::dto::progress::LessonProgressMap;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{Action, Flow, setup_server, setup_test_db, signin_admin_action, signup_action};

fn course_id(ctx: &common::Scratch) -> uuid::Uuid {
    ctx.get_json::<Course>("course").id()
}

fn lesson_id(ctx: &common::Scratch) -> uuid::Uuid {
    ctx.get_json::<Lesson>("lesson").id()
}

#[tokio::test]
async fn route_courses_admin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("student@example.com", "pw").with_save_cookies(true))
        .step(
            Action::post("create_as_student", "/api/courses")
                .with_body(json!({ "code": "CS162", "name": "Operating Systems" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(signin_admin_action().with_clear_cookies(true))
        .step(
            Action::post("create_empty", "/api/courses")
                .with_body(json!({ "code": "", "name": "Nameless" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::post("create", "/api/courses")
                .with_body(json!({
                    "code": "CS162",
                    "name": "Operating Systems",
                    "instructor": "Staff",
                    "units": 4,
                }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("course"),
        )
        .step(
            Action::get("list", "/api/courses")
                .assert_body(|body| assert!(body.contains("Operating Systems"))),
        )
        .step(
            Action::put("update", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", course_id(ctx)))
                .with_body(json!({ "code": "CS162", "name": "OS and Systems Programming" }))
                .assert_body(|body| assert!(body.contains("OS and Systems Programming"))),
        )
        .step(
            Action::get("page", "/api/courses/page")
                .with_param("limit", "10")
                .assert_body(|body| {
                    let page: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(page["total"], json!(1));
                }),
        )
        .step(
            Action::delete("delete", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", course_id(ctx)))
                .assert_body(|body| assert!(body.contains("Course CS162 deleted"))),
        )
        .step(
            Action::get("get_deleted", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", course_id(ctx)))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_lessons_and_progress_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::post("create_course", "/api/courses")
                .with_body(json!({ "code": "CS61A", "name": "Structure and Interpretation" }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("course"),
        )
        .step(
            Action::post("create_lesson", "/api/lessons")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": course_id(ctx),
                        "title": "Higher-order functions",
                        "week": 2,
                        "order": 1,
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson"),
        )
        .step(
            Action::post("add_concept", "")
                .with_dyn_path(|ctx| format!("/api/lessons/{}/concepts", lesson_id(ctx)))
                .with_body(json!({ "title": "Functions as values", "order": 1 }))
                .with_expect(StatusCode::CREATED),
        )
        .step(
            Action::post("add_exercise", "")
                .with_dyn_path(|ctx| format!("/api/lessons/{}/exercises", lesson_id(ctx)))
                .with_body(json!({ "title": "Compose", "hints": ["think of f(g(x))"] }))
                .with_expect(StatusCode::CREATED),
        )
        .step(
            Action::get("course_with_lessons", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", course_id(ctx)))
                .assert_body(|body| {
                    let course: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(course["code"], json!("CS61A"));
                    assert_eq!(course["lessons"].as_array().map(Vec::len), Some(1));
                }),
        )
        .step(
            Action::get("lesson_detail", "")
                .with_dyn_path(|ctx| format!("/api/lessons/{}", lesson_id(ctx)))
                .assert_body(|body| {
                    assert!(body.contains("Functions as values"));
                    assert!(body.contains("think of f(g(x))"));
                }),
        )
        // a student marks the lesson done
        .step(signup_action("learner@example.com", "pw").with_clear_cookies(true))
        .step(
            Action::get("summary_empty", "/api/progress").assert_body(|body| {
                let summary: Value = serde_json::from_str(body).unwrap();
                assert_eq!(summary["completed_lessons"], json!(0));
                assert_eq!(summary["total_lessons"], json!(1));
            }),
        )
        .step(
            Action::post("complete_lesson", "/api/progress/update")
                .with_dyn_body(|ctx| json!({ "lesson_id": lesson_id(ctx), "completed": true })),
        )
        .step(
            Action::get("summary_done", "/api/progress").assert_body(|body| {
                let summary: Value = serde_json::from_str(body).unwrap();
                assert_eq!(summary["completed_lessons"], json!(1));
                assert_eq!(summary["overall_progress"], json!(100.0));
            }),
        )
        .step(
            Action::post("unknown_lesson", "/api/progress/update")
                .with_body(json!({ "lesson_id": uuid::Uuid::new_v4(), "completed": true }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::get("lesson_records", "")
                .with_dyn_path(|ctx| format!("/api/progress/lesson/{}", lesson_id(ctx)))
                .assert_body(|body| assert!(body.contains(r#""completed":true"#))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_lesson_progress_map_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("map@example.com", "pw"))
        .step(
            Action::post("save", "/api/courses/cs162/lessons/week-3/progress")
                .with_body(json!({ "completed": false, "progress": 40 }))
                .assert_body(|body| assert!(body.contains("Progress updated successfully"))),
        )
        .step(
            Action::post("save_again", "/api/courses/cs162/lessons/week-3/progress")
                .with_body(json!({ "completed": true, "progress": 100 })),
        )
        .step(
            Action::get("map", "/api/courses/cs162/lessons/progress").assert_body(|body| {
                let map: LessonProgressMap = serde_json::from_str(body).unwrap();
                let entry = map.progress.get("week-3").expect("entry for week-3");
                assert!(entry.completed);
                assert_eq!(entry.progress, 100);
                assert!(entry.completed_at.is_some());
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_catalog_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("catalog@example.com", "pw"))
        .step(
            Action::get("catalog_list", "/api/courses/catalog")
                .assert_body(|body| assert!(body.contains("CS162"))),
        )
        .step(
            Action::get("catalog_entry", "/api/courses/catalog/cs162").assert_body(|body| {
                let info: Value = serde_json::from_str(body).unwrap();
                assert_eq!(info["code"], json!("CS162"));
                assert!(info["prerequisites"].as_array().is_some_and(|p| !p.is_empty()));
            }),
        )
        .step(
            Action::get("catalog_unknown", "/api/courses/catalog/XYZ999")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
