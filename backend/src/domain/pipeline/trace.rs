//! Tracing stage: one span per dispatched command, closed on every exit path.

use async_trait::async_trait;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::domain::TraceId;
use crate::domain::pipeline::{Command, Fault, Next, RequestContext, Stage};

/// Observability wrapper around the inner chain.
///
/// The stage opens a span labelled with the command name and guarantees its
/// closure whether the chain returns, short-circuits, or faults. When the
/// command carries a previously-captured parent trace identifier and no
/// identifier is in scope, the inner chain runs under that identifier,
/// stitching asynchronous or cross-boundary work back to its originating
/// request. The stage never alters the reply; faults are annotated and then
/// re-raised unchanged.
pub struct Tracing;

#[async_trait]
impl<C: Command> Stage<C> for Tracing {
    async fn handle(
        &self,
        command: &C,
        ctx: &RequestContext,
        next: Next<'_, C>,
    ) -> Result<C::Reply, Fault> {
        let span = info_span!("command", command = C::NAME);
        let inner = next.run(command, ctx).instrument(span.clone());

        let result = match (command.parent_trace(), TraceId::current()) {
            (Some(parent), None) => TraceId::scope(parent, inner).await,
            _ => inner.await,
        };

        if let Err(fault) = &result {
            span.in_scope(|| match fault {
                Fault::Cancelled => debug!(command = C::NAME, "command cancelled"),
                Fault::Rejected { errors } => {
                    warn!(command = C::NAME, count = errors.len(), "command rejected");
                }
                Fault::Unexpected { message } => {
                    error!(command = C::NAME, %message, "command fault");
                }
            });
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::Envelope;
    use crate::domain::pipeline::{Handler, Pipeline};

    struct Stamped {
        parent: Option<TraceId>,
    }

    impl Command for Stamped {
        type Reply = Envelope<String>;
        const NAME: &'static str = "stamped";

        fn parent_trace(&self) -> Option<TraceId> {
            self.parent
        }
    }

    /// Replies with the trace identifier observed inside the handler.
    struct ObservingHandler;

    #[async_trait]
    impl Handler<Stamped> for ObservingHandler {
        async fn handle(
            &self,
            _command: &Stamped,
            _ctx: &RequestContext,
        ) -> Result<Envelope<String>, Fault> {
            let seen = TraceId::current()
                .map(|id| id.to_string())
                .unwrap_or_default();
            Ok(Envelope::success(seen))
        }
    }

    fn traced_pipeline() -> Pipeline<Stamped> {
        Pipeline::new(vec![Arc::new(Tracing)], Arc::new(ObservingHandler))
    }

    #[tokio::test]
    async fn adopts_the_carried_parent_when_no_identifier_is_in_scope() {
        let parent = TraceId::random();
        let reply = traced_pipeline()
            .dispatch(
                &Stamped {
                    parent: Some(parent),
                },
                &RequestContext::detached(),
            )
            .await
            .expect("dispatch succeeds");

        assert_eq!(reply.into_value(), Some(parent.to_string()));
    }

    #[tokio::test]
    async fn keeps_the_ambient_identifier_when_one_is_already_in_scope() {
        let ambient = TraceId::random();
        let carried = TraceId::random();

        let reply = TraceId::scope(ambient, async {
            traced_pipeline()
                .dispatch(
                    &Stamped {
                        parent: Some(carried),
                    },
                    &RequestContext::detached(),
                )
                .await
        })
        .await
        .expect("dispatch succeeds");

        assert_eq!(reply.into_value(), Some(ambient.to_string()));
    }

    #[tokio::test]
    async fn forwards_faults_unchanged() {
        struct FaultingHandler;

        #[async_trait]
        impl Handler<Stamped> for FaultingHandler {
            async fn handle(
                &self,
                _command: &Stamped,
                _ctx: &RequestContext,
            ) -> Result<Envelope<String>, Fault> {
                Err(Fault::unexpected("boom"))
            }
        }

        let pipeline = Pipeline::new(vec![Arc::new(Tracing)], Arc::new(FaultingHandler));
        let fault = pipeline
            .dispatch(&Stamped { parent: None }, &RequestContext::detached())
            .await
            .expect_err("fault is re-raised");

        assert_eq!(
            fault,
            Fault::Unexpected {
                message: "boom".into()
            }
        );
    }
}
