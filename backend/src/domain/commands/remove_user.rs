//! Remove-user command: request, validator, handler, and reply payload.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::pipeline::{
    Command, Fault, FieldFailure, Handler, RequestContext, Validate,
};
use crate::domain::ports::UserRepository;
use crate::domain::{Envelope, Error, TraceId, UserId};

/// Command requesting removal of an existing user.
#[derive(Debug, Clone)]
pub struct RemoveUser {
    /// Identifier of the user to remove.
    pub id: String,
    /// Parent trace identifier captured at the boundary, if any.
    pub parent_trace: Option<TraceId>,
}

impl RemoveUser {
    /// Build the command from boundary input.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_trace: TraceId::current(),
        }
    }
}

impl Command for RemoveUser {
    type Reply = Envelope<RemovedUser>;
    const NAME: &'static str = "remove_user";

    fn parent_trace(&self) -> Option<TraceId> {
        self.parent_trace
    }
}

/// Success value of the remove-user reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemovedUser {
    /// Identifier of the removed user.
    pub removed_id: String,
}

/// Reply envelope for [`RemoveUser`].
pub type RemoveUserReply = Envelope<RemovedUser>;

/// Field-shape rule for user removal: the identifier must be present.
pub struct RemoveUserRules;

#[async_trait]
impl Validate<RemoveUser> for RemoveUserRules {
    async fn check(
        &self,
        command: &RemoveUser,
        _ctx: &RequestContext,
    ) -> Result<Vec<FieldFailure>, Fault> {
        if command.id.trim().is_empty() {
            return Ok(vec![FieldFailure::new("Id", "id must not be empty")]);
        }
        Ok(Vec::new())
    }
}

/// Terminal handler for [`RemoveUser`].
pub struct RemoveUserHandler {
    repo: Arc<dyn UserRepository>,
}

impl RemoveUserHandler {
    /// Create the handler over the user repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    fn not_found(id: &str) -> RemoveUserReply {
        Envelope::failure(Error::not_found(format!(
            "User with id: {id} was not found"
        )))
    }
}

#[async_trait]
impl Handler<RemoveUser> for RemoveUserHandler {
    async fn handle(
        &self,
        command: &RemoveUser,
        ctx: &RequestContext,
    ) -> Result<RemoveUserReply, Fault> {
        // An unparseable identifier cannot name a persisted user.
        let Ok(id) = UserId::new(&command.id) else {
            return Ok(Self::not_found(&command.id));
        };

        let Some(user) = self
            .repo
            .find_by_id(&id, ctx)
            .await
            .map_err(Fault::from)?
        else {
            return Ok(Self::not_found(&command.id));
        };

        // The row can vanish between lookup and delete; report that race as
        // not-found rather than success.
        let deleted = self
            .repo
            .delete(user.id(), ctx)
            .await
            .map_err(Fault::from)?;
        if !deleted {
            return Ok(Self::not_found(&command.id));
        }

        Ok(Envelope::success(RemovedUser {
            removed_id: user.id().to_string(),
        }))
    }
}
