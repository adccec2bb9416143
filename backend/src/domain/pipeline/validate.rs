//! Validation stage: run every registered data validator, merge the failures.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{Instrument, info_span};

use crate::domain::Error;
use crate::domain::pipeline::{Command, Fault, Next, Reply, RequestContext, Stage};

/// One validation failure attributed to a request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    field: &'static str,
    message: String,
}

impl FieldFailure {
    /// Create a failure for the given field.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Human-readable failure message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl From<FieldFailure> for Error {
    fn from(failure: FieldFailure) -> Self {
        Self::validation(failure.field, failure.message)
    }
}

/// A single validator for a command type.
///
/// A validator reports zero or more field failures; returning a [`Fault`]
/// means the validator itself broke (not a validation failure) and the fault
/// propagates to the recovery stage untouched.
#[async_trait]
pub trait Validate<C>: Send + Sync {
    /// Check the command, collecting every failure rather than the first.
    async fn check(
        &self,
        command: &C,
        ctx: &RequestContext,
    ) -> Result<Vec<FieldFailure>, Fault>;
}

/// Validation stage of the command pipeline.
///
/// All registered validators run concurrently; their failures are merged and
/// the stage short-circuits with the full set. Ordering among individual
/// validator outcomes is not significant, only the merged set is.
pub struct Validation<C> {
    validators: Vec<Arc<dyn Validate<C>>>,
}

impl<C> Validation<C> {
    /// Create the stage over the registered validators for `C`.
    pub fn new(validators: Vec<Arc<dyn Validate<C>>>) -> Self {
        Self { validators }
    }
}

#[async_trait]
impl<C: Command> Stage<C> for Validation<C> {
    async fn handle(
        &self,
        command: &C,
        ctx: &RequestContext,
        next: Next<'_, C>,
    ) -> Result<C::Reply, Fault> {
        if self.validators.is_empty() {
            return next.run(command, ctx).await;
        }

        let span = info_span!("validation", command = C::NAME);
        async move {
            let results = join_all(
                self.validators
                    .iter()
                    .map(|validator| validator.check(command, ctx)),
            )
            .await;

            let mut failures = Vec::new();
            for result in results {
                failures.extend(result?);
            }

            if failures.is_empty() {
                next.run(command, ctx).await
            } else {
                C::Reply::short_circuit(failures.into_iter().map(Error::from).collect())
            }
        }
        .instrument(span)
        .await
    }
}
