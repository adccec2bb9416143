//! Business operations dispatched through the command pipeline.

mod create_user;
mod list_users;
mod remove_user;

pub use create_user::{
    CreateUser, CreateUserHandler, CreateUserReply, CreateUserRules, CreatedUser, UniqueNickName,
};
pub use list_users::{ListUsers, ListUsersHandler};
pub use remove_user::{
    RemoveUser, RemoveUserHandler, RemoveUserReply, RemoveUserRules, RemovedUser,
};
