//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users        {"nickName":"Alice","age":30}
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/users
//! ```
//!
//! Command endpoints reply 200 with their envelope regardless of business
//! outcome; transport-level statuses are reserved for query rejections,
//! unexpected faults, and cancellation.

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::commands::{
    CreateUser, CreateUserReply, CreatedUser, ListUsers, RemoveUser, RemoveUserReply, RemovedUser,
};
use crate::domain::pipeline::RequestContext;
use crate::domain::{Envelope, UserView};
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::state::AppState;

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Requested nickname, unique across all users.
    #[schema(example = "Alice")]
    pub nick_name: String,
    /// Requested age in whole years.
    #[schema(example = 30)]
    pub age: i32,
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Create outcome envelope", body = Envelope<CreatedUser>),
        (status = 408, description = "Request cancelled", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<CreateUserReply>> {
    let payload = payload.into_inner();
    let command = CreateUser::new(payload.nick_name, payload.age);
    let reply = state
        .create_user
        .dispatch(&command, &RequestContext::detached())
        .await
        .map_err(ApiError::from)?;
    Ok(web::Json(reply))
}

/// Remove an existing user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Identifier of the user to remove")),
    responses(
        (status = 200, description = "Remove outcome envelope", body = Envelope<RemovedUser>),
        (status = 408, description = "Request cancelled", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "removeUser"
)]
#[delete("/users/{id}")]
pub async fn remove_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RemoveUserReply>> {
    let command = RemoveUser::new(path.into_inner());
    let reply = state
        .remove_user
        .dispatch(&command, &RequestContext::detached())
        .await
        .map_err(ApiError::from)?;
    Ok(web::Json(reply))
}

/// List known users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserView]),
        (status = 408, description = "Request cancelled", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<UserView>>> {
    let query = ListUsers::new();
    let reply = state
        .list_users
        .dispatch(&query, &RequestContext::detached())
        .await
        .map_err(ApiError::from)?;
    Ok(web::Json(reply.into_inner()))
}
