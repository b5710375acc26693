use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::error_response;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Missing required fields: name, category, price")]
    MissingRequiredFields,

    #[error("Invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Product not found")]
    NotFound,

    #[error("No file uploaded.")]
    NoFile,

    #[error("Could not read spreadsheet: {0}")]
    UnreadableSheet(String),

    #[error("No rows found in sheet.")]
    EmptySheet,

    #[error("Malformed form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::InvalidNumber { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NoFile => StatusCode::BAD_REQUEST,
            Self::UnreadableSheet(_) => StatusCode::BAD_REQUEST,
            Self::EmptySheet => StatusCode::BAD_REQUEST,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string(), None, "Catalog request failed")
    }
}
