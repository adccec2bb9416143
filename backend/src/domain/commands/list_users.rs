//! List-users query: request and handler.
//!
//! Query-style requests reply with a plain value rather than an envelope, so
//! any fault escaping the chain is re-raised to the transport layer instead
//! of being converted into an error union.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::pipeline::{Command, Fault, Handler, Plain, RequestContext};
use crate::domain::ports::UserRepository;
use crate::domain::{TraceId, UserView};

/// Query requesting every persisted user.
#[derive(Debug, Clone, Default)]
pub struct ListUsers {
    /// Parent trace identifier captured at the boundary, if any.
    pub parent_trace: Option<TraceId>,
}

impl ListUsers {
    /// Build the query from boundary input.
    pub fn new() -> Self {
        Self {
            parent_trace: TraceId::current(),
        }
    }
}

impl Command for ListUsers {
    type Reply = Plain<Vec<UserView>>;
    const NAME: &'static str = "list_users";

    fn parent_trace(&self) -> Option<TraceId> {
        self.parent_trace
    }
}

/// Terminal handler for [`ListUsers`].
pub struct ListUsersHandler {
    repo: Arc<dyn UserRepository>,
}

impl ListUsersHandler {
    /// Create the handler over the user repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<ListUsers> for ListUsersHandler {
    async fn handle(
        &self,
        _command: &ListUsers,
        ctx: &RequestContext,
    ) -> Result<Plain<Vec<UserView>>, Fault> {
        let users = self.repo.list(ctx).await.map_err(Fault::from)?;
        Ok(Plain(users.iter().map(UserView::from).collect()))
    }
}
