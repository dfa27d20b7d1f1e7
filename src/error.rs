//! Error types for the médiathèque server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchResource = 3,
    BadValue = 4,
    Duplicate = 5,
    MediaUnavailable = 6,
    BorrowingLimitExceeded = 7,
    OverdueLoansExist = 8,
    AlreadyReturned = 9,
    InvalidReturnDate = 10,
}

/// Loan admission failures, produced by the policy engine.
///
/// Variant order mirrors check order: availability, then the open-loan cap,
/// then the overdue block.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    #[error("media is already on loan")]
    MediaUnavailable,

    #[error("member already has the maximum number of open loans")]
    BorrowingLimitExceeded,

    #[error("member has overdue loans")]
    OverdueLoansExist,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Loan refused: {0}")]
    Policy(#[from] PolicyError),

    #[error("Loan has already been returned")]
    AlreadyReturned,

    #[error("Invalid return date: {0}")]
    InvalidReturnDate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchResource, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Policy(policy) => {
                let code = match policy {
                    PolicyError::MediaUnavailable => ErrorCode::MediaUnavailable,
                    PolicyError::BorrowingLimitExceeded => ErrorCode::BorrowingLimitExceeded,
                    PolicyError::OverdueLoansExist => ErrorCode::OverdueLoansExist,
                };
                (StatusCode::CONFLICT, code, policy.to_string())
            }
            AppError::AlreadyReturned => (
                StatusCode::CONFLICT,
                ErrorCode::AlreadyReturned,
                self.to_string(),
            ),
            AppError::InvalidReturnDate(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidReturnDate, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
