use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use sqlx::{MySql, Pool};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use handicraft_store::services::email::{EmailError, Mailer, OutgoingEmail};
use handicraft_store::services::jwt::JwtService;
use handicraft_store::AppSettings;

pub const ADMIN_NOTIFY_EMAIL: &str = "orders-desk@example.com";

/// Captures outgoing mail instead of talking to an SMTP relay.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Rejects every message, like an unreachable SMTP relay.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::InvalidAddress(email.to))
    }
}

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: Pool<MySql>,
    pub mailer: RecordingMailer,
    pub upload_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let mailer = RecordingMailer::default();
        Self::with_mailer(Arc::new(mailer.clone()), mailer).await
    }

    /// Every email send fails; `sent_emails` stays empty.
    pub async fn with_failing_mailer() -> Self {
        Self::with_mailer(Arc::new(FailingMailer), RecordingMailer::default()).await
    }

    async fn with_mailer(app_mailer: Arc<dyn Mailer>, mailer: RecordingMailer) -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

        let db = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let jwt_service = JwtService::new("test-secret-key-for-testing-only".to_string());
        let upload_dir = std::env::temp_dir().join(format!("handicraft-uploads-{}", uuid::Uuid::new_v4()));

        let settings = AppSettings {
            public_base_url: "http://localhost:5000".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            upload_dir: upload_dir.clone(),
            max_body_bytes: 10 * 1024 * 1024,
            auth_rate_limit_per_minute: 1000,
            trust_proxy_headers: false,
            admin_notify_email: Some(ADMIN_NOTIFY_EMAIL.to_string()),
            invoice_font: None,
        };

        let app = handicraft_store::create_app(db.clone(), jwt_service, app_mailer, settings).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        let ctx = Self {
            server,
            db,
            mailer,
            upload_dir,
        };
        ctx.cleanup().await;
        ctx
    }

    pub async fn cleanup(&self) {
        for table in [
            "order_reviews",
            "order_items",
            "orders",
            "product_reviews",
            "products",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.db)
                .await
                .ok();
        }
    }

    pub fn sent_emails(&self) -> Vec<OutgoingEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }

    /// Registers and logs in a fresh user. Returns (email, token).
    pub async fn user_token(&self) -> (String, String) {
        let email = test_email();
        let username = test_username();
        register(self, &username, &email).await;
        let token = login(self, &email).await;
        (email, token)
    }

    /// Same as [`TestContext::user_token`], with the role promoted to admin
    /// before logging in.
    pub async fn admin_token(&self) -> (String, String) {
        let email = test_email();
        register(self, &test_username(), &email).await;

        sqlx::query("UPDATE users SET role = 'admin' WHERE email = ?")
            .bind(&email)
            .execute(&self.db)
            .await
            .expect("Failed to promote admin");

        let token = login(self, &email).await;
        (email, token)
    }

    pub async fn insert_product(&self, name: &str, category: &str, price: &str) -> i64 {
        let result = sqlx::query("INSERT INTO products (name, category, price, main_image) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(category)
            .bind(price)
            .bind("uploads/seed-image.png")
            .execute(&self.db)
            .await
            .expect("Failed to insert product");

        result.last_insert_id() as i64
    }

    /// Places an order through the API and returns its id.
    pub async fn place_order(&self, token: &str, product_id: i64) -> i64 {
        let response = self
            .server
            .post("/api/orders")
            .authorization_bearer(token)
            .json(&json!({
                "total": "998.00",
                "contact_name": "Ana",
                "city": "Jaipur",
                "pincode": "302001",
                "state": "Rajasthan",
                "items": [
                    {"product_id": product_id, "name": "Brass Diya", "price": "499.00", "qty": 2}
                ]
            }))
            .await;

        response.json::<serde_json::Value>()["order_id"]
            .as_i64()
            .expect("order_id in response")
    }

    pub async fn force_status(&self, order_id: i64, status: &str) {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(order_id)
            .execute(&self.db)
            .await
            .expect("Failed to set order status");
    }

    pub async fn first_item_id(&self, order_id: i64) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT id FROM order_items WHERE order_id = ? ORDER BY id LIMIT 1")
            .bind(order_id)
            .fetch_one(&self.db)
            .await
            .expect("order has items");
        row.0
    }
}

async fn register(ctx: &TestContext, username: &str, email: &str) {
    ctx.server
        .post("/api/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": test_password()
        }))
        .await
        .assert_status_ok();
}

async fn login(ctx: &TestContext, email: &str) -> String {
    let response = ctx
        .server
        .post("/api/login")
        .json(&json!({
            "email": email,
            "password": test_password()
        }))
        .await;

    response.json::<serde_json::Value>()["access_token"]
        .as_str()
        .expect("access_token in login response")
        .to_string()
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Usernames are capped at 20 characters.
#[allow(dead_code)]
pub fn test_username() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
