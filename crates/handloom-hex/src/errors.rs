use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handloom_types::domain::validation::{FieldError, ValidationError};
use handloom_types::ports::kv_store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Checkout already in progress")]
    CheckoutInProgress,

    #[error("Storage failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg, errors) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m, None),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m, None),
            AppError::Validation(v) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please fill in all required fields correctly".to_string(),
                Some(v.errors),
            ),
            AppError::CheckoutInProgress => (
                StatusCode::CONFLICT,
                "checkout already in progress".to_string(),
                None,
            ),
            AppError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage unavailable, please retry".to_string(),
                None,
            ),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into(), None),
        };

        let body = serde_json::to_string(&ErrorBody { error: msg, errors })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
