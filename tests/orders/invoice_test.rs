use axum::http::StatusCode;
use serial_test::serial;

use crate::common::TestContext;

#[tokio::test]
#[serial]
async fn owner_downloads_pdf_invoice() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;
    ctx.force_status(order_id, "Delivered").await;

    let response = ctx
        .server
        .get(&format!("/api/orders/{}/invoice", order_id))
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        format!("attachment; filename=invoice-{}.pdf", order_id).as_str()
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn other_users_get_not_found() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let (_, other_token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;

    let response = ctx
        .server
        .get(&format!("/api/orders/{}/invoice", order_id))
        .authorization_bearer(&other_token)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Order not found or unauthorized");

    ctx.server
        .get(&format!("/api/orders/{}/invoice", order_id))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}
