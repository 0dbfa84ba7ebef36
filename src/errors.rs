use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Application result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Body returned for every 500. Internal detail only goes to the log.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while processing your request.";

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unprocessable(msg) => write!(f, "Unprocessable: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn session_not_found() -> Self {
        AppError::NotFound("Upload session not found.".to_string())
    }
}

/// Errors are rendered as plain text, never as JSON.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unprocessable(msg)
            | AppError::PayloadTooLarge(msg) => msg,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(format!(
                "Upload exceeds the size limit: {}",
                err.body_text()
            )),
            _ => AppError::BadRequest(format!("Invalid multipart upload: {}", err.body_text())),
        }
    }
}
