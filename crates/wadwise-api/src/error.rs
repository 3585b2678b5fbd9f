//! Error types for wadwise-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use wadwise_core::{CoreError, ErrorCode};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Backend unavailable: {message}")]
    BadGateway { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Core(e) => match e.code() {
                ErrorCode::AccountNotFound | ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError | ErrorCode::ConfirmationRequired => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::NetworkError => StatusCode::BAD_GATEWAY,
                ErrorCode::InvalidFormat | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("{}", self);
        }
        let body = match &self {
            ApiError::Core(e) => serde_json::to_string(&e.to_details()).unwrap_or_default(),
            other => serde_json::json!({ "error": other.to_string() }).to_string(),
        };
        (status, [(axum::http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
