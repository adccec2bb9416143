//! Create-user command: request, validators, handler, and reply payload.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::pipeline::{
    Command, Fault, FieldFailure, Handler, RequestContext, Validate,
};
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    Age, Envelope, Error, NickName, TraceId, User, UserId, UserView,
};

/// Command requesting creation of a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Requested nickname, unique across all users.
    pub nick_name: String,
    /// Requested age in whole years.
    pub age: i32,
    /// Parent trace identifier captured at the boundary, if any.
    pub parent_trace: Option<TraceId>,
}

impl CreateUser {
    /// Build the command from boundary input.
    pub fn new(nick_name: impl Into<String>, age: i32) -> Self {
        Self {
            nick_name: nick_name.into(),
            age,
            parent_trace: TraceId::current(),
        }
    }
}

impl Command for CreateUser {
    type Reply = Envelope<CreatedUser>;
    const NAME: &'static str = "create_user";

    fn parent_trace(&self) -> Option<TraceId> {
        self.parent_trace
    }
}

/// Success value of the create-user reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    /// Read projection of the persisted user.
    pub user: UserView,
}

/// Reply envelope for [`CreateUser`].
pub type CreateUserReply = Envelope<CreatedUser>;

/// Field-shape rules for user creation: nickname length and age range.
pub struct CreateUserRules;

#[async_trait]
impl Validate<CreateUser> for CreateUserRules {
    async fn check(
        &self,
        command: &CreateUser,
        _ctx: &RequestContext,
    ) -> Result<Vec<FieldFailure>, Fault> {
        let mut failures = Vec::new();
        if let Err(err) = NickName::new(command.nick_name.as_str()) {
            failures.push(FieldFailure::new("NickName", err.to_string()));
        }
        if let Err(err) = Age::new(command.age) {
            failures.push(FieldFailure::new("Age", err.to_string()));
        }
        Ok(failures)
    }
}

/// Fast-path uniqueness check against current persisted state.
///
/// The storage-level constraint remains the source of truth; two concurrent
/// creates for the same nickname can both pass this check and only one will
/// survive the insert.
pub struct UniqueNickName {
    repo: Arc<dyn UserRepository>,
}

impl UniqueNickName {
    /// Create the validator over the user repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Validate<CreateUser> for UniqueNickName {
    async fn check(
        &self,
        command: &CreateUser,
        ctx: &RequestContext,
    ) -> Result<Vec<FieldFailure>, Fault> {
        if self
            .repo
            .nick_name_taken(&command.nick_name, ctx)
            .await
            .map_err(Fault::from)?
        {
            return Ok(vec![FieldFailure::new("NickName", "Nickname must be unique")]);
        }
        Ok(Vec::new())
    }
}

/// Terminal handler for [`CreateUser`].
pub struct CreateUserHandler {
    repo: Arc<dyn UserRepository>,
}

impl CreateUserHandler {
    /// Create the handler over the user repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<CreateUser> for CreateUserHandler {
    async fn handle(
        &self,
        command: &CreateUser,
        ctx: &RequestContext,
    ) -> Result<CreateUserReply, Fault> {
        // The validation stage has already vetted the fields; failing here
        // marks a wiring fault, not user error.
        let nick_name = NickName::new(command.nick_name.as_str()).map_err(|err| {
            Fault::unexpected(format!("unvalidated nickname reached the handler: {err}"))
        })?;
        let age = Age::new(command.age).map_err(|err| {
            Fault::unexpected(format!("unvalidated age reached the handler: {err}"))
        })?;

        let user = User::new(UserId::random(), nick_name, age);

        let persisted_id = match self.repo.insert(&user, ctx).await {
            Ok(id) => id,
            Err(UserRepositoryError::DuplicateNickName) => {
                return Ok(Envelope::failure(Error::validation(
                    "NickName",
                    "Nickname must be unique",
                )));
            }
            Err(err) => return Err(Fault::from(err)),
        };

        if persisted_id.is_nil() {
            return Ok(Envelope::failure(Error::internal(
                "Failed to create new user",
            )));
        }

        Ok(Envelope::success(CreatedUser {
            user: UserView {
                id: persisted_id,
                nick_name: user.nick_name().as_ref().to_owned(),
                age: user.age().value(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserRepository;
    use uuid::Uuid;

    fn command(nick_name: &str, age: i32) -> CreateUser {
        CreateUser {
            nick_name: nick_name.to_owned(),
            age,
            parent_trace: None,
        }
    }

    #[tokio::test]
    async fn rules_pass_for_valid_input() {
        let failures = CreateUserRules
            .check(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect("validator runs");
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn rules_collect_a_failure_per_offending_field() {
        let failures = CreateUserRules
            .check(&command("A", 18), &RequestContext::detached())
            .await
            .expect("validator runs");

        assert_eq!(failures.len(), 2);
        let fields: Vec<_> = failures.iter().map(FieldFailure::field).collect();
        assert!(fields.contains(&"NickName"));
        assert!(fields.contains(&"Age"));
    }

    #[tokio::test]
    async fn uniqueness_validator_flags_a_taken_nickname() {
        let mut repo = MockUserRepository::new();
        repo.expect_nick_name_taken()
            .withf(|nick_name, _ctx| nick_name == "Alice")
            .times(1)
            .return_once(|_, _| Ok(true));

        let failures = UniqueNickName::new(Arc::new(repo))
            .check(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect("validator runs");

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field(), "NickName");
        assert_eq!(failures[0].message(), "Nickname must be unique");
    }

    #[tokio::test]
    async fn uniqueness_validator_raises_repository_faults() {
        let mut repo = MockUserRepository::new();
        repo.expect_nick_name_taken()
            .return_once(|_, _| Err(UserRepositoryError::query("connection reset")));

        let fault = UniqueNickName::new(Arc::new(repo))
            .check(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect_err("repository fault propagates");

        assert!(matches!(fault, Fault::Unexpected { .. }));
    }

    #[tokio::test]
    async fn handler_returns_the_persisted_projection() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|user, _| Ok(*user.id()));

        let reply = CreateUserHandler::new(Arc::new(repo))
            .handle(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect("handler succeeds");

        let created = reply.into_value().expect("success value");
        assert!(!created.user.id.is_nil());
        assert_eq!(created.user.nick_name, "Alice");
        assert_eq!(created.user.age, 30);
    }

    #[tokio::test]
    async fn handler_reports_a_nil_persisted_id_as_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .return_once(|_, _| Ok(UserId::from(Uuid::nil())));

        let reply = CreateUserHandler::new(Arc::new(repo))
            .handle(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect("handler returns an envelope");

        assert_eq!(reply.errors().len(), 1);
        assert_eq!(reply.errors()[0].code(), ErrorCode::Internal);
        assert_eq!(reply.errors()[0].message(), "Failed to create new user");
    }

    #[tokio::test]
    async fn handler_maps_the_storage_uniqueness_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .return_once(|_, _| Err(UserRepositoryError::DuplicateNickName));

        let reply = CreateUserHandler::new(Arc::new(repo))
            .handle(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect("handler returns an envelope");

        assert_eq!(reply.errors().len(), 1);
        assert_eq!(reply.errors()[0].code(), ErrorCode::Validation);
        assert_eq!(reply.errors()[0].field(), Some("NickName"));
    }

    #[tokio::test]
    async fn handler_propagates_cancellation_without_conversion() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .return_once(|_, _| Err(UserRepositoryError::Cancelled));

        let fault = CreateUserHandler::new(Arc::new(repo))
            .handle(&command("Alice", 30), &RequestContext::detached())
            .await
            .expect_err("cancellation surfaces as a fault");

        assert_eq!(fault, Fault::Cancelled);
    }
}
