mod common;
use coursemate::web::dto::auth::AuthResponse;
use coursemate::web::middlewares::AUTH_TOKEN;
use reqwest::StatusCode;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, setup_server, setup_test_db, signin_action, signin_admin_action, signup_action,
};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("Student@Example.com", "hunter22")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let resp: AuthResponse = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(resp.user.email(), "student@example.com");
                    assert!(!resp.access_token.is_empty());
                    assert!(!body.contains("password_hash"));
                })
                .with_expect(StatusCode::OK),
        )
        // same email, different case
        .step(signup_action("student@example.com", "other").with_expect(StatusCode::CONFLICT))
        .step(
            Action::post("signup_missing_name", "/api/auth/signup")
                .with_body(json!({ "email": "x@example.com", "name": " ", "password": "pw" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("signin@example.com", "secret").with_save_cookies(false))
        .step(
            signin_action("signin@example.com", "secret")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let resp: AuthResponse = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(resp.user.email(), "signin@example.com");
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong password
        .step(
            signin_action("signin@example.com", "WRONG")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| assert!(body.contains("Authentication error")))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // unknown account
        .step(
            signin_action("nobody@example.com", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_protected_requires_token_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::get("me_anonymous", "/api/auth/me")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(Action::get("courses_anonymous", "/api/courses").with_expect(StatusCode::UNAUTHORIZED))
        .step(
            Action::get("progress_anonymous", "/api/progress")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::get("transcript_anonymous", "/api/transcript/courses")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // health stays public
        .step(
            Action::get("health", "/api/health")
                .assert_body(|body| assert!(body.contains("healthy"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_bearer_token_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("bearer@example.com", "pw")
                .with_save_cookies(false)
                .with_save_as("session"),
        )
        .step(
            Action::get("me_bearer", "/api/auth/me")
                .with_clear_cookies(true)
                .with_dyn_bearer(|ctx| ctx.get_json::<AuthResponse>("session").access_token)
                .assert_body(|body| assert!(body.contains("bearer@example.com"))),
        )
        .step(
            Action::get("me_bad_bearer", "/api/auth/me")
                .with_dyn_bearer(|_| String::from("not-a-jwt"))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_google_auth_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::post("google_first", "/api/auth/google")
                .with_body(json!({ "access_token": "ada-token" }))
                .with_save_as("first")
                .assert_body(|body| {
                    let resp: AuthResponse = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(resp.user.email(), "ada@gmail.com");
                    assert_eq!(resp.user.name(), "Ada Lovelace");
                    assert_eq!(resp.user.image_url(), Some("https://img.example/g-ada.png"));
                    assert!(!resp.access_token.is_empty());
                }),
        )
        // second sign-in refreshes the same account
        .step(
            Action::post("google_again", "/api/auth/google")
                .with_body(json!({ "access_token": "ada-token-renamed" }))
                .with_save_as("second"),
        )
        .step(
            Action::get("me", "/api/auth/me").assert_body(|body| {
                assert!(body.contains("Renamed"));
                assert!(body.contains("ada@gmail.com"));
            }),
        )
        // no password on an OAuth account
        .step(
            signin_action("ada@gmail.com", "")
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::post("google_missing_token", "/api/auth/google")
                .with_body(json!({ "email": "ada@gmail.com", "google_id": "g-ada" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("access_token is required"))),
        )
        .step(
            Action::post("google_forged_token", "/api/auth/google")
                .with_body(json!({ "access_token": "made-up" }))
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::post("google_unverified", "/api/auth/google")
                .with_body(json!({ "access_token": "unverified-token" }))
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("could not be verified"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_google_cannot_claim_existing_accounts_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("bystander@example.com", "pw"))
        .step(
            Action::post("claim_admin", "/api/auth/google")
                .with_body(json!({ "access_token": "admin-lookalike-token" }))
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| {
                    assert!(body.contains("registered with a different sign-in method"));
                    assert!(!body.contains("access_token"));
                }),
        )
        // still the bystander's session, not an admin one
        .step(
            Action::get("admin_only_page", "/api/courses/page")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(signin_admin_action())
        .step(
            Action::get("admin_untouched", "/api/auth/me").assert_body(|body| {
                assert!(body.contains(r#""role":"admin""#));
                assert!(!body.contains("Mallory"));
            }),
        )
        .step(signup_action("taken@example.com", "secret"))
        .step(
            Action::post("claim_password_account", "/api/auth/google")
                .with_body(json!({ "access_token": "taken-lookalike-token" }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            signin_action("taken@example.com", "secret").assert_body(|body| {
                assert!(body.contains("Test Student"));
                assert!(!body.contains("Mallory"));
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::get("me_admin", "/api/auth/me")
                .assert_body(|body| assert!(body.contains(r#""role":"admin""#))),
        )
        .run(&mut server, pool)
        .await;
}
