use axum::http::StatusCode;
use serial_test::serial;

use crate::common::TestContext;

#[tokio::test]
#[serial]
async fn list_on_empty_catalog_returns_zero_stats() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/products").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["products"].as_array().unwrap().len(), 0);
    assert_eq!(body["stats"]["total"], 0);
    assert_eq!(body["stats"]["categories"], 0);
    assert_eq!(body["stats"]["active"], 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn list_returns_absolute_image_urls_and_stats() {
    let ctx = TestContext::new().await;
    ctx.insert_product("Brass Diya", "Lighting", "499.00").await;
    ctx.insert_product("Brass Bell", "Pooja", "250.00").await;
    let hidden = ctx.insert_product("Brass Lamp", "Lighting", "899.00").await;

    sqlx::query("UPDATE products SET stock = FALSE WHERE id = ?")
        .bind(hidden)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx.server.get("/api/products").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();

    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);
    for product in products {
        assert_eq!(product["main_image"], "http://localhost:5000/uploads/seed-image.png");
        assert_eq!(product["review_count"], 0);
        assert!(product["average_rating"].is_null());
    }

    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["categories"], 2);
    assert_eq!(body["stats"]["active"], 2);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn get_product_returns_detail_or_not_found() {
    let ctx = TestContext::new().await;
    let id = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;

    let response = ctx.server.get(&format!("/api/products/{}", id)).await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Brass Diya");
    assert_eq!(body["price"], "499.00");
    assert_eq!(body["stock"], true);
    assert_eq!(body["testimonials"].as_array().unwrap().len(), 0);

    ctx.server
        .get(&format!("/api/products/{}", id + 1000))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
