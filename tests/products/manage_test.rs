use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serial_test::serial;

use crate::common::TestContext;

fn product_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Brass Diya")
        .add_text("category", "Lighting")
        .add_text("subcategory", "Lamps")
        .add_text("price", "499")
        .add_text("discounted_price", "449.50")
        .add_text("short_desc", "Hand cast brass lamp")
}

#[tokio::test]
#[serial]
async fn create_requires_admin() {
    let ctx = TestContext::new().await;
    let (_, user_token) = ctx.user_token().await;

    ctx.server
        .post("/api/products")
        .multipart(product_form())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/api/products")
        .authorization_bearer(&user_token)
        .multipart(product_form())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn create_stores_upload_and_seed_testimonial() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.admin_token().await;

    let form = product_form()
        .add_text("sub_image_1", "https://cdn.example.com/side.jpg")
        .add_text("review_text", "Beautiful finish")
        .add_text("reviewer_name", "Meera")
        .add_text("rating", "4")
        .add_part(
            "main_image",
            Part::bytes(b"fake image bytes".to_vec())
                .file_name("diya.PNG")
                .mime_type("image/png"),
        );

    let response = ctx
        .server
        .post("/api/products")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let id = body["product_id"].as_i64().unwrap();

    let detail: serde_json::Value = ctx.server.get(&format!("/api/products/{}", id)).await.json();
    assert_eq!(detail["price"], "499.00");
    assert_eq!(detail["discounted_price"], "449.50");
    assert_eq!(detail["stock"], true);
    assert_eq!(detail["sub_image_1"], "https://cdn.example.com/side.jpg");
    assert!(detail["sub_image_2"].is_null());
    assert_eq!(detail["testimonials"][0]["reviewer_name"], "Meera");
    assert_eq!(detail["testimonials"][0]["rating"], 4);

    let main_image = detail["main_image"].as_str().unwrap();
    let file_name = main_image
        .strip_prefix("http://localhost:5000/uploads/")
        .expect("upload served from /uploads");
    assert!(file_name.starts_with("main_image-"));
    assert!(file_name.ends_with(".png"));
    assert_eq!(
        std::fs::read(ctx.upload_dir.join(file_name)).unwrap(),
        b"fake image bytes"
    );

    let served = ctx.server.get(&format!("/uploads/{}", file_name)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), b"fake image bytes");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn create_with_missing_or_invalid_fields_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.admin_token().await;

    let missing = MultipartForm::new()
        .add_text("name", "Brass Diya")
        .add_text("category", "Lighting");
    ctx.server
        .post("/api/products")
        .authorization_bearer(&token)
        .multipart(missing)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let bad_price = MultipartForm::new()
        .add_text("name", "Brass Diya")
        .add_text("category", "Lighting")
        .add_text("price", "cheap");
    ctx.server
        .post("/api/products")
        .authorization_bearer(&token)
        .multipart(bad_price)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn update_keeps_absent_images_and_clears_empty_ones() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.admin_token().await;
    let id = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;

    sqlx::query("UPDATE products SET sub_image_1 = 'uploads/side.png', stock = FALSE WHERE id = ?")
        .bind(id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let form = MultipartForm::new()
        .add_text("name", "Brass Diya Large")
        .add_text("category", "Lighting")
        .add_text("price", "599")
        .add_text("sub_image_1", "");

    ctx.server
        .put(&format!("/api/products/{}", id))
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .assert_status_ok();

    let detail: serde_json::Value = ctx.server.get(&format!("/api/products/{}", id)).await.json();
    assert_eq!(detail["name"], "Brass Diya Large");
    assert_eq!(detail["price"], "599.00");
    assert_eq!(detail["main_image"], "http://localhost:5000/uploads/seed-image.png");
    assert!(detail["sub_image_1"].is_null());
    // Stock was not part of the form.
    assert_eq!(detail["stock"], false);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn update_missing_product_returns_not_found() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.admin_token().await;

    ctx.server
        .put("/api/products/999999")
        .authorization_bearer(&token)
        .multipart(product_form())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn delete_removes_product_once() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.admin_token().await;
    let id = ctx.insert_product("Brass Diya", "Lighting", "499.00").await;

    ctx.server
        .delete(&format!("/api/products/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    ctx.server
        .get(&format!("/api/products/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.server
        .delete(&format!("/api/products/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
