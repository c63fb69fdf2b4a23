//! Request body extraction
//!
//! Wraps [`axum::Json`] so malformed bodies are answered with the same
//! error envelope as every other failure.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::AppError;

/// JSON request body; rejections become [`AppError::BadRequest`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
