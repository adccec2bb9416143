//! In-memory user repository.
//!
//! Default adapter for local runs and tests. It mirrors the PostgreSQL
//! adapter's contract, including the nickname uniqueness constraint, which it
//! enforces inside its write lock so concurrent creates cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::pipeline::RequestContext;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId};

/// Process-local user store behind an async read/write lock.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    fn ensure_live(ctx: &RequestContext) -> Result<(), UserRepositoryError> {
        if ctx.is_cancelled() {
            return Err(UserRepositoryError::Cancelled);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        ctx: &RequestContext,
    ) -> Result<UserId, UserRepositoryError> {
        Self::ensure_live(ctx)?;
        let mut store = self.store.write().await;
        let taken = store
            .values()
            .any(|existing| existing.nick_name() == user.nick_name());
        if taken {
            return Err(UserRepositoryError::DuplicateNickName);
        }
        store.insert(*user.id().as_uuid(), user.clone());
        Ok(*user.id())
    }

    async fn find_by_id(
        &self,
        id: &UserId,
        ctx: &RequestContext,
    ) -> Result<Option<User>, UserRepositoryError> {
        Self::ensure_live(ctx)?;
        Ok(self.store.read().await.get(id.as_uuid()).cloned())
    }

    async fn delete(
        &self,
        id: &UserId,
        ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        Self::ensure_live(ctx)?;
        Ok(self.store.write().await.remove(id.as_uuid()).is_some())
    }

    async fn nick_name_taken(
        &self,
        nick_name: &str,
        ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        Self::ensure_live(ctx)?;
        Ok(self
            .store
            .read()
            .await
            .values()
            .any(|user| user.nick_name().as_ref() == nick_name))
    }

    async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, UserRepositoryError> {
        Self::ensure_live(ctx)?;
        let mut users: Vec<User> = self.store.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.nick_name().as_ref().cmp(b.nick_name().as_ref()));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn user(id: &str, nick_name: &str) -> User {
        User::try_from_parts(id, nick_name, 30).expect("valid user")
    }

    #[tokio::test]
    async fn insert_then_find_then_delete_round_trips() {
        let repo = MemoryUserRepository::new();
        let ctx = RequestContext::detached();
        let alice = user("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice");

        let id = repo.insert(&alice, &ctx).await.expect("insert succeeds");
        assert_eq!(id, *alice.id());
        assert_eq!(
            repo.find_by_id(&id, &ctx).await.expect("lookup succeeds"),
            Some(alice.clone())
        );

        assert!(repo.delete(&id, &ctx).await.expect("delete succeeds"));
        assert!(!repo.delete(&id, &ctx).await.expect("second delete runs"));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_nickname_is_rejected_by_the_store() {
        let repo = MemoryUserRepository::new();
        let ctx = RequestContext::detached();
        repo.insert(&user("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice"), &ctx)
            .await
            .expect("first insert succeeds");

        let err = repo
            .insert(&user("00000000-0000-0000-0000-000000000001", "Alice"), &ctx)
            .await
            .expect_err("duplicate nickname must fail");
        assert_eq!(err, UserRepositoryError::DuplicateNickName);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn nick_name_taken_reflects_stored_users() {
        let repo = MemoryUserRepository::new();
        let ctx = RequestContext::detached();
        assert!(!repo.nick_name_taken("Alice", &ctx).await.expect("check"));
        repo.insert(&user("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice"), &ctx)
            .await
            .expect("insert succeeds");
        assert!(repo.nick_name_taken("Alice", &ctx).await.expect("check"));
    }

    #[tokio::test]
    async fn list_returns_users_in_nickname_order() {
        let repo = MemoryUserRepository::new();
        let ctx = RequestContext::detached();
        repo.insert(&user("00000000-0000-0000-0000-000000000001", "Zoe"), &ctx)
            .await
            .expect("insert succeeds");
        repo.insert(&user("00000000-0000-0000-0000-000000000002", "Alice"), &ctx)
            .await
            .expect("insert succeeds");

        let names: Vec<String> = repo
            .list(&ctx)
            .await
            .expect("list succeeds")
            .iter()
            .map(|u| u.nick_name().as_ref().to_owned())
            .collect();
        assert_eq!(names, vec!["Alice".to_owned(), "Zoe".to_owned()]);
    }

    #[tokio::test]
    async fn cancelled_context_stops_every_operation() {
        let repo = MemoryUserRepository::new();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::new(token);
        let alice = user("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Alice");

        assert_eq!(
            repo.insert(&alice, &ctx).await.expect_err("insert aborts"),
            UserRepositoryError::Cancelled
        );
        assert!(repo.is_empty().await, "no partial row after cancellation");
        assert_eq!(
            repo.list(&ctx).await.expect_err("list aborts"),
            UserRepositoryError::Cancelled
        );
    }
}
