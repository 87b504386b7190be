//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use doc_store::DocStoreError;
use domain::DomainError;
use quoting::QuotingError;
use reporting::ReportingError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Quote commit or workflow error.
    Quoting(QuotingError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Quoting(err) => quoting_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::DocStore(DocStoreError::RevisionConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn quoting_error_to_response(err: QuotingError) -> (StatusCode, String) {
    match err {
        QuotingError::EmptyQuote
        | QuotingError::InvalidQuantity { .. }
        | QuotingError::DuplicateLineItem(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        QuotingError::ProductNotFound(_) | QuotingError::QuoteNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        QuotingError::InsufficientStock { .. }
        | QuotingError::TransactionConflict { .. }
        | QuotingError::InvalidStatusTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        QuotingError::Domain(inner) => domain_error_to_response(inner),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<QuotingError> for ApiError {
    fn from(err: QuotingError) -> Self {
        ApiError::Quoting(err)
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
