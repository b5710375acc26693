use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::model::OrderStatus;
use crate::error::error_response;
use crate::services::invoice::InvoiceError;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Missing order data.")]
    MissingOrderData,

    #[error("{0}")]
    InvalidItem(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Order not found")]
    NotFound,

    #[error("Order not found or unauthorized")]
    NotFoundOrUnauthorized,

    #[error("Unknown order status '{0}'")]
    UnknownStatus(String),

    #[error("Cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error("Order is not yet delivered")]
    NotDelivered,

    #[error("Item not found in this order")]
    ItemNotFound,

    #[error("You have already reviewed this item")]
    AlreadyReviewed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invoice error: {0}")]
    Invoice(#[from] InvoiceError),
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingOrderData => StatusCode::BAD_REQUEST,
            Self::InvalidItem(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            Self::UnknownStatus(_) => StatusCode::BAD_REQUEST,
            Self::IllegalTransition { .. } => StatusCode::CONFLICT,
            Self::InvalidRating => StatusCode::BAD_REQUEST,
            Self::NotDelivered => StatusCode::BAD_REQUEST,
            Self::ItemNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyReviewed => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Invoice(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            Self::Invoice(_) => "Failed to generate invoice",
            _ => "Order request failed",
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let details = match &self {
            Self::UnknownStatus(_) => Some(
                OrderStatus::ALL
                    .iter()
                    .map(OrderStatus::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        };
        error_response(self.status_code(), self.to_string(), details, self.fallback())
    }
}
