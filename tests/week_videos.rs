mod common;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, FakeVideos, Flow, setup_server, setup_server_with_services, setup_test_db,
    signup_action,
};

const GUIDE: &str = "# Week 3 Study Guide

## Virtual Memory

**Page tables** map virtual pages to frames.
";

/// `<course>/W3/study_guide.md` under a fresh temp dir.
fn course_dir() -> (tempfile::TempDir, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let week = dir.path().join("W3");
    std::fs::create_dir(&week).unwrap();
    let guide = week.join("study_guide.md");
    std::fs::write(&guide, GUIDE).unwrap();
    let course = dir.path().to_string_lossy().to_string();
    let guide = guide.to_string_lossy().to_string();
    (dir, course, guide)
}

#[tokio::test]
async fn route_week_generate_and_fetch_test() {
    let pool = setup_test_db().await;
    let videos = FakeVideos::with_titles(&[
        "Virtual Memory Paging Explained",
        "Page Tables in Operating Systems",
        "Virtual Memory Paging Explained again",
    ]);
    let mut server = setup_server_with_services(&pool, None, Some(videos)).await;
    let (_dir, _course, guide) = course_dir();

    Flow::new()
        .step(signup_action("videos@example.com", "pw"))
        .step(
            Action::get("week_empty", "/api/week-videos/cs162/weeks/3/videos")
                .assert_body(|body| assert!(body.contains("No videos found for CS162 Week 3"))),
        )
        .step(
            Action::post("generate_week", "/api/week-videos/cs162/weeks/3/generate")
                .with_body(json!({ "study_guide_path": guide, "max_videos": 3 }))
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["success"], json!(true));
                    assert_eq!(resp["course_code"], json!("CS162"));
                    assert_eq!(resp["videos"].as_array().map(Vec::len), Some(3));
                    // two titles share their first four words
                    assert_eq!(resp["message"], json!("Generated and saved 2 videos for Week 3"));
                }),
        )
        .step(
            Action::post("oversized_limit", "/api/week-videos/cs162/weeks/3/generate")
                .with_body(json!({ "study_guide_path": guide, "max_videos": u64::MAX }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("max_videos must be between 1 and 50"))),
        )
        .step(
            Action::get("week_videos", "/api/week-videos/CS162/weeks/3/videos").assert_body(
                |body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["week_number"], json!(3));
                    assert_eq!(resp["videos"].as_array().map(Vec::len), Some(2));
                    assert!(body.contains("https://www.youtube.com/watch?v=vid"));
                },
            ),
        )
        .step(
            Action::get("course_videos", "/api/week-videos/cs162/videos").assert_body(
                |body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["total_weeks"], json!(1));
                    assert_eq!(resp["total_videos"], json!(2));
                    assert!(resp["videos_by_week"]["3"].is_array());
                },
            ),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_generate_test() {
    let pool = setup_test_db().await;
    let videos = FakeVideos::with_titles(&["Virtual Memory Paging Explained"]);
    let mut server = setup_server_with_services(&pool, None, Some(videos)).await;
    let (_dir, course, _guide) = course_dir();

    Flow::new()
        .step(signup_action("course-videos@example.com", "pw"))
        .step(
            Action::post("generate_course", "/api/week-videos/cs162/generate")
                .with_body(json!({ "course_path": course, "max_videos_per_week": 2 }))
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["success"], json!(true));
                    assert_eq!(resp["results"]["total_weeks"], json!(1));
                    assert_eq!(resp["results"]["processed_weeks"], json!(1));
                    assert_eq!(resp["message"], json!("Generated 1 videos for 1 weeks"));
                }),
        )
        .step(
            Action::post("zero_per_week", "/api/week-videos/cs162/generate")
                .with_body(json!({ "course_path": course, "max_videos_per_week": 0 }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("max_videos_per_week must be between 1 and 50"))
                }),
        )
        .step(
            Action::post("missing_path", "/api/week-videos/cs162/generate")
                .with_body(json!({}))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("course_path is required"))),
        )
        .step(
            Action::post("nonexistent_path", "/api/week-videos/cs162/generate")
                .with_body(json!({ "course_path": "/nonexistent/course/dir" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("Course path does not exist"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_videos_quota_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server_with_services(&pool, None, Some(FakeVideos::over_quota())).await;
    let (_dir, course, guide) = course_dir();

    Flow::new()
        .step(signup_action("quota@example.com", "pw"))
        .step(
            Action::post("week_quota", "/api/week-videos/cs162/weeks/3/generate")
                .with_body(json!({ "study_guide_path": guide }))
                .with_expect(StatusCode::TOO_MANY_REQUESTS)
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["quota_exceeded"], json!(true));
                    assert_eq!(resp["success"], json!(false));
                }),
        )
        .step(
            Action::post("course_quota", "/api/week-videos/cs162/generate")
                .with_body(json!({ "course_path": course }))
                .with_expect(StatusCode::TOO_MANY_REQUESTS)
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["quota_exceeded"], json!(true));
                    assert!(body.contains("API quota exceeded - stopped at week 3"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_videos_without_api_key_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;
    let (_dir, _course, guide) = course_dir();

    Flow::new()
        .step(signup_action("nokey@example.com", "pw"))
        .step(
            Action::post("week_unavailable", "/api/week-videos/cs162/weeks/3/generate")
                .with_body(json!({ "study_guide_path": guide }))
                .with_expect(StatusCode::SERVICE_UNAVAILABLE),
        )
        .run(&mut server, pool)
        .await;
}
