//! HTTP error handling and conversion.
//!
//! This module provides error types for the REST API and implements
//! conversion from service errors to HTTP responses. Every error response
//! carries a [`FailureInfo`] extension so the interception layer observes
//! the handler call as failed.

use crate::services::ServiceError;
use aop_logging_interceptor::{FailureInfo, InvocationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Service layer error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Request rejected before reaching the service layer
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::InvalidOrder(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Service(err) => err.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl InvocationError for ApiError {
    fn type_name(&self) -> &str {
        match self {
            Self::Service(err) => err.type_name(),
            Self::Validation(_) => std::any::type_name::<Self>(),
        }
    }
}

/// Body of every error response: a stable code plus a readable message
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let failure = FailureInfo::of(&self);

        let body = ErrorResponse::new(self.error_code(), self.to_string());
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
