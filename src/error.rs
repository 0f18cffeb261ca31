//! Error types for LendShare server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::enums::LendingStatus;

/// Stable numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NotFound = 5,
    BadValue = 6,
    SelfBorrow = 7,
    InvalidDateRange = 8,
    PastDate = 9,
    ItemUnavailable = 10,
    OwnerBlocked = 11,
    RequestOverlap = 12,
    InvalidTransition = 13,
    ConcurrentUpdate = 14,
}

/// Client-fixable problems with the request payload itself
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestViolation {
    #[error("you cannot borrow your own item")]
    SelfBorrow,
    #[error("end date must be after start date and within the allowed length")]
    InvalidDateRange,
    #[error("start date cannot be in the past")]
    PastDate,
}

/// Reasons a date range cannot be booked for an item
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityConflict {
    #[error("item is not available for lending")]
    ItemUnavailable,
    #[error("item is blocked by its owner for the requested dates")]
    OwnerBlocked,
    #[error("item is already requested for overlapping dates")]
    RequestOverlap,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] RequestViolation),

    #[error("Conflict: {0}")]
    Conflict(#[from] AvailabilityConflict),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: LendingStatus,
        to: LendingStatus,
    },

    #[error("Lending request {0} was modified concurrently")]
    ConcurrentUpdate(i32),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Validation(violation) => {
                let code = match violation {
                    RequestViolation::SelfBorrow => ErrorCode::SelfBorrow,
                    RequestViolation::InvalidDateRange => ErrorCode::InvalidDateRange,
                    RequestViolation::PastDate => ErrorCode::PastDate,
                };
                (StatusCode::BAD_REQUEST, code)
            }
            AppError::Conflict(conflict) => {
                let code = match conflict {
                    AvailabilityConflict::ItemUnavailable => ErrorCode::ItemUnavailable,
                    AvailabilityConflict::OwnerBlocked => ErrorCode::OwnerBlocked,
                    AvailabilityConflict::RequestOverlap => ErrorCode::RequestOverlap,
                };
                (StatusCode::CONFLICT, code)
            }
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, ErrorCode::InvalidTransition),
            AppError::ConcurrentUpdate(_) => (StatusCode::CONFLICT, ErrorCode::ConcurrentUpdate),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
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
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
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
