//! HTTP mapping for pipeline faults and domain errors.
//!
//! Command-style endpoints return their envelope with status 200 and never
//! surface a fault directly; this module is the global fault handler for
//! everything else: query-style rejections, unexpected faults, and
//! cancellation.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::pipeline::Fault;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Stable machine-readable code of a transport-level error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    /// The request is malformed or fails validation.
    Validation,
    /// Authentication failed or is missing.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// The request was cancelled before completion.
    Cancelled,
    /// An unexpected error occurred on the server.
    Internal,
}

impl From<ErrorCode> for ApiErrorCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Validation => Self::Validation,
            ErrorCode::Unauthorized => Self::Unauthorized,
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::Internal => Self::Internal,
        }
    }
}

impl ApiErrorCode {
    fn as_status_code(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Transport-level error response payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    pub code: ApiErrorCode,
    /// Human-readable error message.
    #[schema(example = "User was not found")]
    pub message: String,
    /// Correlation identifier for tracing this error across systems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ApiError {
    /// Create a new error, capturing the scoped trace identifier when one is
    /// present.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Redacted internal error.
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "Internal server error")
    }
}

impl From<&Error> for ApiError {
    fn from(error: &Error) -> Self {
        Self::new(ApiErrorCode::from(error.code()), error.message())
    }
}

impl From<Fault> for ApiError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Cancelled => Self::new(ApiErrorCode::Cancelled, "request was cancelled"),
            Fault::Rejected { errors } => errors
                .first()
                .map_or_else(Self::internal, Self::from),
            // Fault detail stays in the logs.
            Fault::Unexpected { .. } => Self::internal(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.as_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        builder.json(self)
    }
}
