use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of every non-2xx API response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Builds the response for a module error. Internal failures are logged and
/// answered with `fallback`, never with the underlying cause.
pub fn error_response(
    status: StatusCode,
    message: String,
    details: Option<String>,
    fallback: &'static str,
) -> Response {
    if status.is_server_error() {
        tracing::error!(error = %message, "{}", fallback);
        return (status, axum::Json(ErrorResponse::new(fallback))).into_response();
    }
    let body = match details {
        Some(details) => ErrorResponse::with_details(message, details),
        None => ErrorResponse::new(message),
    };
    (status, axum::Json(body)).into_response()
}

/// Unique-key violation (MySQL error 1062).
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// JSON body extractor and response. Unlike `axum::Json`, a body that is
/// missing, not JSON, or of the wrong shape is answered with a 400 in the
/// usual `{error, details}` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid request body".to_string(),
                    Some(rejection.body_text()),
                    "Invalid request body",
                ))
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
