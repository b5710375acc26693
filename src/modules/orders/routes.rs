use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(controller::list_all_orders).post(controller::create_order))
        .route("/my", get(controller::list_my_orders))
        .route("/{id}/status", put(controller::update_status))
        .route("/{id}/invoice", get(controller::generate_invoice))
        .route("/{id}/review", post(controller::submit_review))
}
