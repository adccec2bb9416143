//! PostgreSQL-backed user repository.
//!
//! The `users.nick_name` UNIQUE constraint is the source of truth for
//! nickname uniqueness; this adapter surfaces its violation as
//! [`UserRepositoryError::DuplicateNickName`] so the create handler can map
//! the lost race to the same user-visible validation error as the fast-path
//! check.

use std::future::Future;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::pipeline::RequestContext;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId};

use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create the repository over an established connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Build { message } | PoolError::Checkout { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(message = info.message(), "unique constraint rejected insert");
            UserRepositoryError::DuplicateNickName
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserRepositoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => {
            UserRepositoryError::query(info.message().to_owned())
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        other => UserRepositoryError::query(other.to_string()),
    }
}

fn map_row(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row)
        .map_err(|err| UserRepositoryError::query(format!("stored user is invalid: {err}")))
}

/// Race the operation against the request's cancellation signal.
async fn run_cancellable<T, F>(ctx: &RequestContext, op: F) -> Result<T, UserRepositoryError>
where
    F: Future<Output = Result<T, UserRepositoryError>>,
{
    tokio::select! {
        biased;
        () = ctx.cancel_token().cancelled() => Err(UserRepositoryError::Cancelled),
        result = op => result,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        ctx: &RequestContext,
    ) -> Result<UserId, UserRepositoryError> {
        let row = UserRow::from(user);
        run_cancellable(ctx, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let id: Uuid = diesel::insert_into(users::table)
                .values(&row)
                .returning(users::id)
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(UserId::from(id))
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: &UserId,
        ctx: &RequestContext,
    ) -> Result<Option<User>, UserRepositoryError> {
        run_cancellable(ctx, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: Option<UserRow> = users::table
                .find(id.as_uuid())
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            row.map(map_row).transpose()
        })
        .await
    }

    async fn delete(
        &self,
        id: &UserId,
        ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        run_cancellable(ctx, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let deleted = diesel::delete(users::table.find(id.as_uuid()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn nick_name_taken(
        &self,
        nick_name: &str,
        ctx: &RequestContext,
    ) -> Result<bool, UserRepositoryError> {
        run_cancellable(ctx, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::select(diesel::dsl::exists(
                users::table.filter(users::nick_name.eq(nick_name)),
            ))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, UserRepositoryError> {
        run_cancellable(ctx, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<UserRow> = users::table
                .select(UserRow::as_select())
                .order(users::nick_name.asc())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            rows.into_iter().map(map_row).collect()
        })
        .await
    }
}
