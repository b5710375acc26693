use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_email, test_password, test_username, TestContext};

/// Registers a user, requests a reset and pulls the token out of the email.
async fn create_user_and_get_reset_token(ctx: &TestContext) -> (String, String) {
    let email = test_email();

    ctx.server
        .post("/api/register")
        .json(&json!({"username": test_username(), "email": &email, "password": test_password()}))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/forgot-password")
        .json(&json!({"email": &email}))
        .await
        .assert_status_ok();

    let html = ctx.sent_emails().last().expect("reset email sent").html.clone();
    let start = html.find("token=").expect("token in reset link") + "token=".len();
    let token: String = html[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();
    assert_eq!(token.len(), 64);

    (email, token)
}

#[tokio::test]
#[serial]
async fn reset_password_with_valid_token_allows_new_login() {
    let ctx = TestContext::new().await;
    let (email, token) = create_user_and_get_reset_token(&ctx).await;

    let response = ctx
        .server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "NewPassword123!"}))
        .await;

    response.assert_status(StatusCode::OK);

    ctx.server
        .post("/api/login")
        .json(&json!({"email": &email, "password": "NewPassword123!"}))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/login")
        .json(&json!({"email": &email, "password": test_password()}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_token_is_single_use() {
    let ctx = TestContext::new().await;
    let (email, token) = create_user_and_get_reset_token(&ctx).await;

    ctx.server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "NewPassword123!"}))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "OtherPassword123!"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid token or email.");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_with_expired_token_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (email, token) = create_user_and_get_reset_token(&ctx).await;

    sqlx::query("UPDATE users SET reset_token_expiry = NOW() - INTERVAL 1 MINUTE WHERE email = ?")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "NewPassword123!"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Expired token.");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_with_wrong_token_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (email, _) = create_user_and_get_reset_token(&ctx).await;

    let response = ctx
        .server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": "0".repeat(64), "password": "NewPassword123!"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_rejects_weak_password_and_missing_fields() {
    let ctx = TestContext::new().await;
    let (email, token) = create_user_and_get_reset_token(&ctx).await;

    ctx.server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "weak"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/reset-password")
        .json(&json!({"email": &email}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // The token survives a rejected attempt.
    ctx.server
        .post("/api/reset-password")
        .json(&json!({"email": &email, "token": &token, "password": "NewPassword123!"}))
        .await
        .assert_status_ok();

    ctx.cleanup().await;
}
