pub mod config;
pub mod error;
pub mod modules;
pub mod services;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};

use config::DbPool;
use modules::auth::auth_routes;
use modules::orders::order_routes;
use modules::products::product_routes;
use services::email::Mailer;
use services::images::ImageUrls;
use services::jwt::JwtService;
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub mailer: Arc<dyn Mailer>,
    pub images: ImageUrls,
    pub frontend_url: String,
    pub admin_notify_email: Option<String>,
    pub invoice_font: Option<Arc<Vec<u8>>>,
}

/// Deployment-specific settings the router needs beyond its services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub public_base_url: String,
    pub frontend_url: String,
    pub upload_dir: std::path::PathBuf,
    pub max_body_bytes: usize,
    pub auth_rate_limit_per_minute: u32,
    pub trust_proxy_headers: bool,
    pub admin_notify_email: Option<String>,
    /// TrueType bytes for invoices, loaded at startup.
    pub invoice_font: Option<Arc<Vec<u8>>>,
}

impl AppSettings {
    pub fn from_config(config: &config::Config) -> Self {
        Self {
            public_base_url: config.public_base_url.clone(),
            frontend_url: config.frontend_url.clone(),
            upload_dir: config.upload_dir.clone(),
            max_body_bytes: config.max_body_bytes,
            auth_rate_limit_per_minute: config.auth_rate_limit_per_minute,
            trust_proxy_headers: config.trust_proxy_headers,
            admin_notify_email: config.admin_notify_email.clone(),
            invoice_font: None,
        }
    }
}

pub async fn create_app(
    db: DbPool,
    jwt_service: JwtService,
    mailer: Arc<dyn Mailer>,
    settings: AppSettings,
) -> Router {
    let uploads = ServeDir::new(&settings.upload_dir);

    let state = Arc::new(AppState {
        db,
        jwt_service,
        mailer,
        images: ImageUrls::new(settings.public_base_url, settings.upload_dir),
        frontend_url: settings.frontend_url,
        admin_notify_email: settings.admin_notify_email,
        invoice_font: settings.invoice_font,
    });

    let api = Router::new()
        .merge(auth_routes(settings.auth_rate_limit_per_minute, settings.trust_proxy_headers))
        .nest("/products", product_routes())
        .nest("/orders", order_routes());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .layer(middleware::from_fn(security_headers))
        // Image uploads need more than axum's 2 MB default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Handicraft Store API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
