use axum::{routing::post, Router};
use std::sync::Arc;

use crate::AppState;
use crate::services::rate_limit::{create_rate_limiter, RateLimitLayer};
use super::controller;

/// Auth endpoints, rate limited per client.
pub fn auth_routes(rate_limit_per_minute: u32, trust_proxy_headers: bool) -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/forgot-password", post(controller::forgot_password))
        .route("/reset-password", post(controller::reset_password))
        .layer(
            RateLimitLayer::new(create_rate_limiter(rate_limit_per_minute))
                .trust_forwarded_headers(trust_proxy_headers),
        )
}
