//! Domain-level error vocabulary.
//!
//! These errors are transport agnostic. Command replies carry them inside a
//! failure [`Envelope`](crate::domain::Envelope); the HTTP adapter maps them
//! to status codes for query-style requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A request field is malformed or fails a validation rule.
    Validation,
    /// Authentication failed or an authorization requirement is unsatisfied.
    Unauthorized,
    /// The referenced entity does not exist.
    NotFound,
    /// An unexpected fault inside the pipeline or a collaborator.
    Internal,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty human-readable text.
/// - `field` names the offending request field when one is attributable
///   (validation failures, field-level authorization failures).
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::validation("NickName", "Nickname must be unique");
/// assert_eq!(err.code(), ErrorCode::Validation);
/// assert_eq!(err.field(), Some("NickName"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Error {
    #[schema(example = "validation")]
    code: ErrorCode,
    #[schema(example = "Nickname must be unique")]
    message: String,
    #[serde(rename = "fieldName", skip_serializing_if = "Option::is_none")]
    #[schema(example = "NickName")]
    field: Option<String>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Validation failure attributed to a request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message).with_field(field)
    }

    /// Authorization failure with a specific message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Authorization failure with the canonical message.
    pub fn unauthorized_default() -> Self {
        Self::unauthorized("Unauthorised to process or access resource")
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Attach the offending field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Offending field name, when one is attributable.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}
