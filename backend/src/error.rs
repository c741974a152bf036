//! Error handling for the Post-Harvest Risk Platform
//!
//! Provides consistent error responses in Bangla and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DraftViolation;
use thiserror::Error;

use crate::storage::KvError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_bn: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // Sync errors
    #[error("Sync already in progress")]
    SyncInProgress,

    #[error("Device is offline")]
    Offline,

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    #[error("Remote store error: {0}")]
    Remote(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<DraftViolation> for AppError {
    fn from(violation: DraftViolation) -> Self {
        AppError::Validation {
            field: violation.field.to_string(),
            message: violation.message.to_string(),
            message_bn: violation.message_bn.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(KvError::Serialization(err.to_string()))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_bn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::SyncInProgress => "SYNC_IN_PROGRESS",
            AppError::Offline => "OFFLINE",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Remote(_) => "REMOTE_STORE_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_bn,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code,
                    message_en: message.clone(),
                    message_bn: message_bn.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code,
                    message_en: format!("{} not found", resource),
                    message_bn: format!("{} পাওয়া যায়নি", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code,
                    message_en: msg.clone(),
                    message_bn: format!("অবস্থা পরিবর্তন করা যাবে না: {}", msg),
                    field: None,
                },
            ),
            AppError::SyncInProgress => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code,
                    message_en: "A sync is already in progress. Please wait.".to_string(),
                    message_bn: "সিঙ্ক চলছে। অনুগ্রহ করে অপেক্ষা করুন।".to_string(),
                    field: None,
                },
            ),
            AppError::Offline => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code,
                    message_en: "You are offline. Data will sync when the connection returns."
                        .to_string(),
                    message_bn: "আপনি অফলাইনে আছেন। সংযোগ ফিরলে তথ্য সিঙ্ক হবে।".to_string(),
                    field: None,
                },
            ),
            AppError::Storage(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code,
                    message_en: format!("Storage error: {}", err),
                    message_bn: "তথ্য সংরক্ষণে সমস্যা হয়েছে".to_string(),
                    field: None,
                },
            ),
            AppError::Remote(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code,
                    message_en: format!("Remote store error: {}", msg),
                    message_bn: "সার্ভারে তথ্য পাঠানো যায়নি".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code,
                    message_en: "A database error occurred".to_string(),
                    message_bn: "ডাটাবেসে সমস্যা হয়েছে".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code,
                    message_en: msg.clone(),
                    message_bn: "সার্ভারে অভ্যন্তরীণ সমস্যা হয়েছে".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code,
                    message_en: "An internal server error occurred".to_string(),
                    message_bn: "সার্ভারে অভ্যন্তরীণ সমস্যা হয়েছে".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_violation_conversion() {
        let violation = DraftViolation {
            field: "weightKg",
            message: "Weight must be greater than zero",
            message_bn: "ওজন শূন্যের বেশি হতে হবে",
        };
        let err: AppError = violation.into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "weightKg"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::SyncInProgress.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("Batch".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidStateTransition("completed -> active".into())
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
