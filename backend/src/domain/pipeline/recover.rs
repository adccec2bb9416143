//! Recovery stage: outermost safety net converting unhandled faults.

use async_trait::async_trait;
use tracing::error;

use crate::domain::pipeline::{Command, Fault, Next, Reply, RequestContext, Stage};

/// Outermost stage of every pipeline.
///
/// An unexpected fault escaping the inner stages is recorded and then, when
/// the command's reply shape can express failures, converted into an
/// internal-error reply; the pipeline recovers at this boundary only. Reply
/// shapes without an error union re-raise the fault so the transport's
/// top-level fault handling can map it. Cancellation and business rejections
/// pass through untouched; cancellation in particular is never rewritten into
/// an internal error.
pub struct Recovery;

#[async_trait]
impl<C: Command> Stage<C> for Recovery {
    async fn handle(
        &self,
        command: &C,
        ctx: &RequestContext,
        next: Next<'_, C>,
    ) -> Result<C::Reply, Fault> {
        match next.run(command, ctx).await {
            Err(Fault::Unexpected { message }) => {
                error!(command = C::NAME, %message, command_failed = true, "unhandled pipeline fault");
                match C::Reply::absorb_unexpected(&message) {
                    Some(reply) => Ok(reply),
                    None => Err(Fault::Unexpected { message }),
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::pipeline::{Handler, Pipeline, Plain};
    use crate::domain::{Envelope, Error, ErrorCode};

    struct EnvelopeOp;

    impl Command for EnvelopeOp {
        type Reply = Envelope<u32>;
        const NAME: &'static str = "envelope_op";
    }

    struct PlainOp;

    impl Command for PlainOp {
        type Reply = Plain<u32>;
        const NAME: &'static str = "plain_op";
    }

    /// Handler that always raises an unexpected fault; works for any reply
    /// shape because it never builds one.
    struct Exploding;

    #[async_trait]
    impl<C: Command> Handler<C> for Exploding {
        async fn handle(
            &self,
            _command: &C,
            _ctx: &RequestContext,
        ) -> Result<C::Reply, Fault> {
            Err(Fault::unexpected("database exploded"))
        }
    }

    struct Cancelling;

    #[async_trait]
    impl<C: Command> Handler<C> for Cancelling {
        async fn handle(
            &self,
            _command: &C,
            _ctx: &RequestContext,
        ) -> Result<C::Reply, Fault> {
            Err(Fault::Cancelled)
        }
    }

    struct Rejecting;

    #[async_trait]
    impl<C: Command> Handler<C> for Rejecting {
        async fn handle(
            &self,
            _command: &C,
            _ctx: &RequestContext,
        ) -> Result<C::Reply, Fault> {
            Err(Fault::rejected(vec![Error::unauthorized_default()]))
        }
    }

    struct Succeeding;

    #[async_trait]
    impl Handler<EnvelopeOp> for Succeeding {
        async fn handle(
            &self,
            _command: &EnvelopeOp,
            _ctx: &RequestContext,
        ) -> Result<Envelope<u32>, Fault> {
            Ok(Envelope::success(7))
        }
    }

    #[tokio::test]
    async fn unexpected_faults_become_internal_error_envelopes() {
        let pipeline =
            Pipeline::<EnvelopeOp>::new(vec![Arc::new(Recovery)], Arc::new(Exploding));

        let reply = pipeline
            .dispatch(&EnvelopeOp, &RequestContext::detached())
            .await
            .expect("fault is absorbed");

        assert_eq!(reply.errors().len(), 1);
        assert_eq!(reply.errors()[0].code(), ErrorCode::Internal);
        assert_eq!(reply.errors()[0].message(), "Internal server error");
    }

    #[tokio::test]
    async fn unexpected_faults_propagate_for_plain_replies() {
        let pipeline = Pipeline::<PlainOp>::new(vec![Arc::new(Recovery)], Arc::new(Exploding));

        let fault = pipeline
            .dispatch(&PlainOp, &RequestContext::detached())
            .await
            .expect_err("fault is re-raised");

        assert!(matches!(fault, Fault::Unexpected { .. }));
    }

    #[tokio::test]
    async fn cancellation_passes_through_untouched() {
        let pipeline =
            Pipeline::<EnvelopeOp>::new(vec![Arc::new(Recovery)], Arc::new(Cancelling));

        let fault = pipeline
            .dispatch(&EnvelopeOp, &RequestContext::detached())
            .await
            .expect_err("cancellation is not absorbed");

        assert_eq!(fault, Fault::Cancelled);
    }

    #[tokio::test]
    async fn business_rejections_pass_through_untouched() {
        let pipeline = Pipeline::<PlainOp>::new(vec![Arc::new(Recovery)], Arc::new(Rejecting));

        let fault = pipeline
            .dispatch(&PlainOp, &RequestContext::detached())
            .await
            .expect_err("rejection is not absorbed");

        assert!(matches!(fault, Fault::Rejected { .. }));
    }

    #[tokio::test]
    async fn successful_replies_are_forwarded() {
        let pipeline =
            Pipeline::<EnvelopeOp>::new(vec![Arc::new(Recovery)], Arc::new(Succeeding));

        let reply = pipeline
            .dispatch(&EnvelopeOp, &RequestContext::detached())
            .await
            .expect("dispatch succeeds");

        assert_eq!(reply.value(), Some(&7));
    }
}
