mod common;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, FakeModel, Flow, setup_server, setup_server_with_services, setup_test_db,
    signup_action,
};

#[tokio::test]
async fn route_classify_topic_test() {
    let pool = setup_test_db().await;
    let model = FakeModel::replying("  Scheduling\n");
    let mut server = setup_server_with_services(&pool, Some(model.clone()), None).await;

    Flow::new()
        .step(signup_action("classify@example.com", "pw"))
        .step(
            Action::post("classify", "/api/classify/topic")
                .with_body(json!({
                    "content": "Round robin gives every job a fixed quantum.",
                    "courseCode": "cs162",
                }))
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["topic"], json!("Scheduling"));
                    assert!(resp.get("warning").is_none());
                }),
        )
        .step(
            Action::post("classify_missing", "/api/classify/topic")
                .with_body(json!({ "content": "something" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("Content and courseCode are required"))),
        )
        .step(
            Action::post("classify_unsupported", "/api/classify/topic")
                .with_body(json!({ "content": "something", "courseCode": "CS61A" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("Topic classification is not supported for CS61A"))
                }),
        )
        .run(&mut server, pool)
        .await;

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Round robin"));
}

#[tokio::test]
async fn route_classify_fallback_test() {
    let pool = setup_test_db().await;
    let model = FakeModel::replying("I am not sure");
    let mut server = setup_server_with_services(&pool, Some(model), None).await;

    Flow::new()
        .step(signup_action("fallback@example.com", "pw"))
        .step(
            Action::post("classify_fallback", "/api/classify/topic")
                .with_body(json!({ "content": "Unrelated text", "courseCode": "CS162" }))
                .assert_body(|body| {
                    let resp: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(resp["topic"], json!("Operating System Concepts"));
                    assert_eq!(
                        resp["warning"],
                        json!("Could not accurately classify topic, using default")
                    );
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_classify_without_model_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("nomodel-classify@example.com", "pw"))
        .step(
            Action::post("classify_unavailable", "/api/classify/topic")
                .with_body(json!({ "content": "Deadlock avoidance", "courseCode": "CS162" }))
                .with_expect(StatusCode::SERVICE_UNAVAILABLE),
        )
        .run(&mut server, pool)
        .await;
}
