//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::pipeline::RequestContext;
use crate::domain::{User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The nickname uniqueness constraint rejected an insert.
    ///
    /// Storage is the source of truth for uniqueness; the async validator is
    /// only a fast-path hint, so concurrent creates can still reach the
    /// constraint.
    #[error("nickname is already taken")]
    DuplicateNickName,
    /// The operation observed the request's cancellation signal.
    #[error("operation was cancelled")]
    Cancelled,
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for user persistence.
///
/// All operations are asynchronous and observe the request's cancellation
/// signal through the supplied context; a cancelled operation returns
/// [`UserRepositoryError::Cancelled`] rather than a partial result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record, returning the persisted identifier.
    async fn insert(
        &self,
        user: &User,
        ctx: &RequestContext,
    ) -> Result<UserId, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(
        &self,
        id: &UserId,
        ctx: &RequestContext,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Delete a user by identifier; `false` when no matching row existed.
    async fn delete(&self, id: &UserId, ctx: &RequestContext)
    -> Result<bool, UserRepositoryError>;

    /// Whether any persisted user already holds the given nickname.
    async fn nick_name_taken(
        &self,
        nick_name: &str,
        ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError>;

    /// All persisted users.
    async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, UserRepositoryError>;
}

/// Fixture repository for tests that do not exercise persistence.
///
/// Inserts echo the caller-supplied identifier, lookups find nothing, and
/// deletes report no matching row.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(
        &self,
        user: &User,
        _ctx: &RequestContext,
    ) -> Result<UserId, UserRepositoryError> {
        Ok(*user.id())
    }

    async fn find_by_id(
        &self,
        _id: &UserId,
        _ctx: &RequestContext,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn delete(
        &self,
        _id: &UserId,
        _ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        Ok(false)
    }

    async fn nick_name_taken(
        &self,
        _nick_name: &str,
        _ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        Ok(false)
    }

    async fn list(&self, _ctx: &RequestContext) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
