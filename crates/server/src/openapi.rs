use common::types::{ErrorMessage, Health};
use models::{Gender, User};
use utoipa::OpenApi;

use crate::routes::users::UserResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            Health,
            Gender,
            User,
            UserResponse,
            ErrorMessage,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
