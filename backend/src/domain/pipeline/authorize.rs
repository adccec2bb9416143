//! Authorization stage: evaluate declarative access requirements.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{Instrument, info_span};

use crate::domain::Error;
use crate::domain::pipeline::{
    Command, Fault, Next, Reply, RequestContext, Stage, Validate,
};
use crate::domain::ports::Identity;

/// Declarative access requirements attached to a command type.
///
/// Requirements are plain static data inspected by the authorization stage;
/// there is no runtime discovery. An all-empty descriptor (the default) makes
/// the stage a no-op for that command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequirements {
    /// The caller must be authenticated.
    pub authenticated: bool,
    /// For each group, the caller must hold at least one of the listed roles.
    pub role_groups: &'static [&'static [&'static str]],
    /// The caller must satisfy every listed policy.
    pub policies: &'static [&'static str],
    /// Run the field-level authorization validators registered for the
    /// command.
    pub field_checks: bool,
}

impl AccessRequirements {
    /// No requirements: the authorization stage passes unconditionally.
    pub const NONE: Self = Self {
        authenticated: false,
        role_groups: &[],
        policies: &[],
        field_checks: false,
    };

    /// Whether any requirement is declared at all.
    pub const fn requires_anything(&self) -> bool {
        self.authenticated
            || !self.role_groups.is_empty()
            || !self.policies.is_empty()
            || self.field_checks
    }
}

/// Authorization stage of the command pipeline.
///
/// Requirements are evaluated in order (authentication, role groups,
/// policies, field-level validators) and the first unsatisfied one
/// short-circuits the chain with unauthorized errors. Field-level validators
/// run concurrently with the same aggregation semantics as the validation
/// stage, preserving the failing field name on each error.
pub struct Authorization<C> {
    identity: Arc<dyn Identity>,
    validators: Vec<Arc<dyn Validate<C>>>,
}

impl<C> Authorization<C> {
    /// Create the stage over the identity collaborator and the field-level
    /// authorization validators registered for `C`.
    pub fn new(identity: Arc<dyn Identity>, validators: Vec<Arc<dyn Validate<C>>>) -> Self {
        Self {
            identity,
            validators,
        }
    }
}

impl<C: Command> Authorization<C> {
    async fn evaluate(&self, command: &C, ctx: &RequestContext) -> Result<Vec<Error>, Fault> {
        let access = C::ACCESS;

        if access.authenticated && !self.identity.authenticated().await {
            return Ok(vec![Error::unauthorized_default()]);
        }

        for group in access.role_groups {
            let mut satisfied = false;
            for role in *group {
                if self.identity.has_role(role).await {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                return Ok(vec![Error::unauthorized("Role authorization failure")]);
            }
        }

        for policy in access.policies {
            if !self.identity.satisfies_policy(policy).await {
                return Ok(vec![Error::unauthorized(format!(
                    "Policy: {policy} authorization failure"
                ))]);
            }
        }

        if access.field_checks && !self.validators.is_empty() {
            let results = join_all(
                self.validators
                    .iter()
                    .map(|validator| validator.check(command, ctx)),
            )
            .await;

            let mut errors = Vec::new();
            for result in results {
                for failure in result? {
                    errors.push(
                        Error::unauthorized(failure.message().to_owned())
                            .with_field(failure.field()),
                    );
                }
            }
            return Ok(errors);
        }

        Ok(Vec::new())
    }
}

#[async_trait]
impl<C: Command> Stage<C> for Authorization<C> {
    async fn handle(
        &self,
        command: &C,
        ctx: &RequestContext,
        next: Next<'_, C>,
    ) -> Result<C::Reply, Fault> {
        if !C::ACCESS.requires_anything() {
            return next.run(command, ctx).await;
        }

        let span = info_span!("authorization", command = C::NAME);
        async move {
            let errors = self.evaluate(command, ctx).await?;
            if errors.is_empty() {
                next.run(command, ctx).await
            } else {
                C::Reply::short_circuit(errors)
            }
        }
        .instrument(span)
        .await
    }
}
