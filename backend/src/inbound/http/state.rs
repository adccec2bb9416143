//! Shared HTTP adapter state: the composed pipelines.
//!
//! Pipelines are composed once when the application is wired and shared with
//! handlers via `actix_web::web::Data`, so handlers depend only on the
//! dispatch surface and stay testable with in-memory adapters.

use std::sync::Arc;

use crate::domain::commands::{
    CreateUser, CreateUserHandler, CreateUserRules, ListUsers, ListUsersHandler, RemoveUser,
    RemoveUserHandler, RemoveUserRules, UniqueNickName,
};
use crate::domain::pipeline::Pipeline;
use crate::domain::ports::{Identity, UserRepository};

/// One composed pipeline per operation.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline for the create-user command.
    pub create_user: Pipeline<CreateUser>,
    /// Pipeline for the remove-user command.
    pub remove_user: Pipeline<RemoveUser>,
    /// Pipeline for the list-users query.
    pub list_users: Pipeline<ListUsers>,
}

impl AppState {
    /// Compose every pipeline over the given collaborators.
    ///
    /// This is the single place where stage order and validator registration
    /// are fixed.
    pub fn build(repo: Arc<dyn UserRepository>, identity: Arc<dyn Identity>) -> Self {
        let create_user = Pipeline::standard(
            identity.clone(),
            vec![
                Arc::new(CreateUserRules),
                Arc::new(UniqueNickName::new(repo.clone())),
            ],
            Vec::new(),
            Arc::new(CreateUserHandler::new(repo.clone())),
        );

        let remove_user = Pipeline::standard(
            identity.clone(),
            vec![Arc::new(RemoveUserRules)],
            Vec::new(),
            Arc::new(RemoveUserHandler::new(repo.clone())),
        );

        let list_users = Pipeline::standard(
            identity,
            Vec::new(),
            Vec::new(),
            Arc::new(ListUsersHandler::new(repo)),
        );

        Self {
            create_user,
            remove_user,
            list_users,
        }
    }
}
