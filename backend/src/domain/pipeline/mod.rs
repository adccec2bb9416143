//! Command pipeline: ordered middleware stages around terminal handlers.
//!
//! Every operation is a typed [`Command`] dispatched through a [`Pipeline`]
//! whose stage order is fixed when the application is wired:
//! recovery → tracing → authorization → validation → handler, outermost
//! first. Each stage either short-circuits with a populated reply or invokes
//! the rest of the chain exactly once through its [`Next`] continuation.
//!
//! The reply shape decides how failures surface. Envelope replies
//! (command-style requests) absorb business errors and unexpected faults as
//! structured error lists; [`Plain`] replies (query-style requests) push both
//! onto the fault channel for the transport layer to map. Cancellation is a
//! third, distinct outcome and is never rewritten into an internal error.

mod authorize;
mod recover;
mod trace;
mod validate;

pub use authorize::{AccessRequirements, Authorization};
pub use recover::Recovery;
pub use trace::Tracing;
pub use validate::{FieldFailure, Validate, Validation};

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::ports::{Identity, UserRepositoryError};
use crate::domain::{Envelope, Error, TraceId};

/// Per-request execution context threaded through every stage and port call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
}

impl RequestContext {
    /// Context driven by the given cancellation token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Context with a fresh token that nothing cancels.
    ///
    /// Used by transports that have no cancellation signal to propagate.
    pub fn detached() -> Self {
        Self::default()
    }

    /// The cancellation token for this request.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Failure channel of the pipeline chain.
///
/// Business failures belonging to an envelope reply never travel here; they
/// are written into the envelope by the stage that produced them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// The request's cancellation signal fired; stop promptly.
    #[error("request was cancelled")]
    Cancelled,
    /// Business rejection raised for a reply shape with no error union.
    #[error("request rejected with {} error(s)", .errors.len())]
    Rejected { errors: Vec<Error> },
    /// Unexpected fault from a stage, handler, or collaborator.
    #[error("unexpected fault: {message}")]
    Unexpected { message: String },
}

impl Fault {
    /// Create an unexpected fault with the given message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Create a business rejection carrying the collected errors.
    pub fn rejected(errors: Vec<Error>) -> Self {
        Self::Rejected { errors }
    }
}

impl From<UserRepositoryError> for Fault {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::Cancelled => Self::Cancelled,
            other => Self::unexpected(other.to_string()),
        }
    }
}

/// Reply shape of a pipeline, known at compile time per operation.
///
/// The two implementations encode the command/query split: [`Envelope`]
/// replies convert failures into structured error lists, [`Plain`] replies
/// re-raise them for the transport's global fault handling.
pub trait Reply: Send + Sized + 'static {
    /// Turn collected business errors into a reply, or route them to the
    /// fault channel when this shape has no error union.
    fn short_circuit(errors: Vec<Error>) -> Result<Self, Fault>;

    /// Absorb an unexpected fault at the pipeline boundary, if this shape can
    /// express it. `None` means the fault must propagate to the caller.
    fn absorb_unexpected(message: &str) -> Option<Self>;
}

impl<T: Send + 'static> Reply for Envelope<T> {
    fn short_circuit(errors: Vec<Error>) -> Result<Self, Fault> {
        Ok(Self::from_errors(errors))
    }

    fn absorb_unexpected(_message: &str) -> Option<Self> {
        // The fault detail stays in the logs; clients get a redacted message.
        Some(Self::failure(Error::internal("Internal server error")))
    }
}

/// Query-style reply with no error union; failures travel the fault channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plain<T>(pub T);

impl<T> Plain<T> {
    /// Consume the wrapper, yielding the reply value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Send + 'static> Reply for Plain<T> {
    fn short_circuit(errors: Vec<Error>) -> Result<Self, Fault> {
        Err(Fault::rejected(errors))
    }

    fn absorb_unexpected(_message: &str) -> Option<Self> {
        None
    }
}

/// A typed pipeline request.
///
/// Access requirements are declared statically on the command type; the
/// authorization stage inspects them without any runtime discovery.
pub trait Command: Send + Sync + 'static {
    /// Reply shape produced by this command's pipeline.
    type Reply: Reply;

    /// Name used to label tracing spans and log events.
    const NAME: &'static str;

    /// Declarative access requirements evaluated by the authorization stage.
    const ACCESS: AccessRequirements = AccessRequirements::NONE;

    /// Previously-captured parent trace identifier, if the command was
    /// created outside the current request scope.
    fn parent_trace(&self) -> Option<TraceId> {
        None
    }
}

/// Terminal stage of a pipeline. Handlers never call `next`.
#[async_trait]
pub trait Handler<C: Command>: Send + Sync {
    /// Execute the business operation.
    async fn handle(&self, command: &C, ctx: &RequestContext) -> Result<C::Reply, Fault>;
}

/// One link in the ordered request-processing chain.
#[async_trait]
pub trait Stage<C: Command>: Send + Sync {
    /// Process the command, either short-circuiting with a reply or invoking
    /// `next` exactly once.
    async fn handle(
        &self,
        command: &C,
        ctx: &RequestContext,
        next: Next<'_, C>,
    ) -> Result<C::Reply, Fault>;
}

/// Opaque continuation over the remaining stages and the terminal handler.
pub struct Next<'a, C: Command> {
    stages: &'a [Arc<dyn Stage<C>>],
    handler: &'a dyn Handler<C>,
}

impl<C: Command> Next<'_, C> {
    /// Invoke the rest of the chain.
    pub async fn run(self, command: &C, ctx: &RequestContext) -> Result<C::Reply, Fault> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    handler: self.handler,
                };
                stage.handle(command, ctx, next).await
            }
            None => self.handler.handle(command, ctx).await,
        }
    }
}

/// Ordered stage list plus terminal handler, composed once at wiring time.
pub struct Pipeline<C: Command> {
    stages: Vec<Arc<dyn Stage<C>>>,
    handler: Arc<dyn Handler<C>>,
}

impl<C: Command> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<C: Command> Pipeline<C> {
    /// Compose a pipeline from an explicit stage list.
    ///
    /// Stage order is outermost first; prefer [`Pipeline::standard`] unless a
    /// test needs a bespoke chain.
    pub fn new(stages: Vec<Arc<dyn Stage<C>>>, handler: Arc<dyn Handler<C>>) -> Self {
        Self { stages, handler }
    }

    /// Compose the standard chain:
    /// recovery → tracing → authorization → validation → handler.
    pub fn standard(
        identity: Arc<dyn Identity>,
        validators: Vec<Arc<dyn Validate<C>>>,
        auth_validators: Vec<Arc<dyn Validate<C>>>,
        handler: Arc<dyn Handler<C>>,
    ) -> Self {
        Self::new(
            vec![
                Arc::new(Recovery),
                Arc::new(Tracing),
                Arc::new(Authorization::new(identity, auth_validators)),
                Arc::new(Validation::new(validators)),
            ],
            handler,
        )
    }

    /// Dispatch a command through the composed chain.
    pub async fn dispatch(&self, command: &C, ctx: &RequestContext) -> Result<C::Reply, Fault> {
        let next = Next {
            stages: self.stages.as_slice(),
            handler: self.handler.as_ref(),
        };
        next.run(command, ctx).await
    }
}
