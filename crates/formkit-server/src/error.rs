// File: src/error.rs
// Purpose: Handler error type so handlers can use `?`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Anything a handler can fail with
#[derive(Debug)]
pub enum AppError {
    /// A form could not be composed (bad declaration)
    Form(formkit::FormError),
    /// Anything else
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Form(err) => {
                tracing::error!("Form declaration error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Form could not be rendered").into_response()
            }
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
        }
    }
}

impl From<formkit::FormError> for AppError {
    fn from(err: formkit::FormError) -> Self {
        AppError::Form(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.into())
    }
}
