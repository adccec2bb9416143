//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for the
//! user endpoints. The generated document backs Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::commands::{CreatedUser, RemovedUser};
use crate::domain::{Envelope, Error, ErrorCode, UserView};
use crate::inbound::http::{ApiError, ApiErrorCode};

/// OpenAPI document for the user API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User command pipeline demo",
        description = "Centralized error handling conventions around two user \
                       commands and one query."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::remove_user,
        crate::inbound::http::users::list_users,
    ),
    components(schemas(
        Envelope<CreatedUser>,
        Envelope<RemovedUser>,
        CreatedUser,
        RemovedUser,
        UserView,
        Error,
        ErrorCode,
        ApiError,
        ApiErrorCode,
    ))
)]
pub struct ApiDoc;
