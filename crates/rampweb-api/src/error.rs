//! Error types for rampweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rampweb_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Upstream failure: {message}")]
    Upstream { message: String },

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error.code() {
            ErrorCode::InvalidRequest => ApiError::BadRequest { message: error.to_string() },
            ErrorCode::GatewayError | ErrorCode::DecodeError => ApiError::Upstream { message: error.to_string() },
            _ => ApiError::InternalError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = format!(
            "<div class='bg-red-50 border border-red-200 rounded-lg p-4 text-sm text-red-700' role='alert'>{}</div>",
            crate::escape_html(&self.to_string())
        );
        (self.status(), axum::response::Html(body)).into_response()
    }
}
