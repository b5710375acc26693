use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::TestContext;

async fn review(ctx: &TestContext, token: &str, order_id: i64, body: serde_json::Value) -> axum_test::TestResponse {
    ctx.server
        .post(&format!("/api/orders/{}/review", order_id))
        .authorization_bearer(token)
        .json(&body)
        .await
}

#[tokio::test]
#[serial]
async fn review_on_delivered_order_is_accepted_once() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;
    ctx.force_status(order_id, "Delivered").await;
    let item_id = ctx.first_item_id(order_id).await;

    let response = review(&ctx, &token, order_id, json!({"item_id": item_id, "rating": 4, "comment": "Lovely"})).await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let again = review(&ctx, &token, order_id, json!({"item_id": item_id, "rating": 5})).await;
    again.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = again.json();
    assert_eq!(body["error"], "You have already reviewed this item");

    // The review feeds the item flag and the product rating.
    let orders: serde_json::Value = ctx.server.get("/api/orders/my").authorization_bearer(&token).await.json();
    assert_eq!(orders["orders"][0]["items"][0]["reviewed"], true);

    let detail: serde_json::Value = ctx.server.get(&format!("/api/products/{}", product)).await.json();
    assert_eq!(detail["review_count"], 1);
    assert_eq!(detail["average_rating"], "4.0");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn review_before_delivery_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;
    let item_id = ctx.first_item_id(order_id).await;

    for status in ["Placed", "Shipped"] {
        ctx.force_status(order_id, status).await;
        review(&ctx, &token, order_id, json!({"item_id": item_id, "rating": 5}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn review_rating_must_be_in_range() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;
    ctx.force_status(order_id, "Delivered").await;
    let item_id = ctx.first_item_id(order_id).await;

    for rating in [0, 6] {
        let response = review(&ctx, &token, order_id, json!({"item_id": item_id, "rating": rating})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Rating must be between 1 and 5");
    }

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn review_of_foreign_order_or_item_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let (_, other_token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;

    let order_id = ctx.place_order(&token, product).await;
    let other_order = ctx.place_order(&other_token, product).await;
    ctx.force_status(order_id, "Delivered").await;
    ctx.force_status(other_order, "Delivered").await;
    let item_id = ctx.first_item_id(order_id).await;
    let other_item = ctx.first_item_id(other_order).await;

    review(&ctx, &other_token, order_id, json!({"item_id": item_id, "rating": 5}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    review(&ctx, &token, order_id, json!({"item_id": other_item, "rating": 5}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn review_with_wrongly_typed_rating_gets_json_error() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user_token().await;
    let product = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    let order_id = ctx.place_order(&token, product).await;
    ctx.force_status(order_id, "Delivered").await;
    let item_id = ctx.first_item_id(order_id).await;

    let response = review(&ctx, &token, order_id, json!({"item_id": item_id, "rating": "5"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].as_str().unwrap().contains("rating"));

    let stored: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_reviews")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(stored.0, 0);

    ctx.cleanup().await;
}
