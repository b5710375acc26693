use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(controller::list_products).post(controller::create_product))
        .route("/bulk-import", post(controller::bulk_import))
        .route(
            "/{id}",
            get(controller::get_product)
                .put(controller::update_product)
                .delete(controller::delete_product),
        )
}
