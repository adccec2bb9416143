//! Success/failure envelope returned by every command operation.
//!
//! The envelope is the command-style reply shape: either a success value or a
//! non-empty list of domain errors, never both and never neither. The
//! invariant is enforced by construction; fields are private and the only
//! construction paths are the [`Envelope::success`] and failure factories.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;

/// Generic command reply carrying either a success value or domain errors.
///
/// The success value is flattened into the envelope on the wire, so
/// `Envelope<CreatedUser>` serialises as `{"user": {...}, "errors": []}` and
/// a failure envelope as `{"errors": [{...}]}`.
///
/// # Examples
/// ```
/// use backend::domain::{Envelope, Error};
///
/// let ok = Envelope::success(42);
/// assert_eq!(ok.value(), Some(&42));
/// assert!(ok.errors().is_empty());
///
/// let failed = Envelope::<u32>::failure(Error::not_found("missing"));
/// assert!(failed.value().is_none());
/// assert_eq!(failed.errors().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    #[serde(flatten)]
    value: Option<T>,
    errors: Vec<Error>,
}

impl<T> Envelope<T> {
    /// Success envelope: value set, errors empty.
    pub fn success(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// Failure envelope carrying a single error.
    pub fn failure(error: Error) -> Self {
        Self {
            value: None,
            errors: vec![error],
        }
    }

    /// Failure envelope carrying every collected error.
    ///
    /// An empty input would break the envelope invariant, so it is replaced
    /// by a canonical internal error.
    pub fn from_errors(errors: impl IntoIterator<Item = Error>) -> Self {
        let mut errors: Vec<Error> = errors.into_iter().collect();
        if errors.is_empty() {
            errors.push(Error::internal("Internal server error"));
        }
        Self {
            value: None,
            errors,
        }
    }

    /// Append an error to an existing failure envelope.
    ///
    /// Must not be called on a success envelope; the invariant that value and
    /// errors are mutually exclusive is checked in debug builds only.
    pub fn add_error(&mut self, error: Error) {
        debug_assert!(self.value.is_none(), "add_error on a success envelope");
        self.errors.push(error);
    }

    /// The success value, absent on failure envelopes.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Consume the envelope, yielding the success value if present.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Collected errors; empty exactly when the envelope is a success.
    pub fn errors(&self) -> &[Error] {
        self.errors.as_slice()
    }

    /// Whether this envelope carries a success value.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
