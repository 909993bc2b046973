use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::NaiveDate;
use common::types::ErrorMessage;
use models::User;
use serde::{Deserialize, Serialize};
use service::MutationStatus;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{errors::JsonApiError, metrics, routes::AppState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// `MALE` or `FEMALE`, case-insensitive.
    pub gender: Option<String>,
}

/// User as rendered to clients, with the derived date of birth.
#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    /// Derived from `age`.
    pub date_of_birth: Option<NaiveDate>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let date_of_birth = user.date_of_birth();
        Self { user, date_of_birth }
    }
}

fn outcome<T>(operation: &str, res: &Result<T, JsonApiError>) {
    let label = match res {
        Ok(_) => "ok",
        Err(e) if e.status == StatusCode::NOT_FOUND => "not_found",
        Err(e) if e.status.is_client_error() => "rejected",
        Err(_) => "error",
    };
    metrics::record(operation, label);
}

#[utoipa::path(
    get, path = "/users", tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users, optionally filtered by gender", body = [UserResponse]),
        (status = 400, description = "Invalid gender", body = ErrorMessage)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(q): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, JsonApiError> {
    let res = state
        .users
        .get_all_users(q.gender.as_deref())
        .await
        .map(|users| Json(users.into_iter().map(UserResponse::from).collect()))
        .map_err(JsonApiError::from);
    outcome("list", &res);
    res
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "OK", body = UserResponse),
        (status = 404, description = "Not Found", body = ErrorMessage)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, JsonApiError> {
    let res = match state.users.get_user(id).await {
        Ok(Some(user)) => Ok(Json(UserResponse::from(user))),
        Ok(None) => Err(JsonApiError::not_found(ErrorMessage::user_not_found(id))),
        Err(e) => Err(e.into()),
    };
    outcome("get", &res);
    res
}

/// Any `id` in the body is discarded; the service assigns a new one.
#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = User,
    responses((status = 200, description = "Created"))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut user): Json<User>,
) -> Result<StatusCode, JsonApiError> {
    let res = match state.users.insert_user(&mut user).await {
        Ok(_) => {
            info!(user_id = ?user.id, "created user");
            Ok(StatusCode::OK)
        }
        Err(e) => Err(e.into()),
    };
    outcome("create", &res);
    res
}

#[utoipa::path(
    put, path = "/users", tag = "users",
    request_body = User,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Unknown or missing id", body = ErrorMessage)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<StatusCode, JsonApiError> {
    let id = user.id;
    let res = match state.users.update_user(user).await {
        Ok(MutationStatus::Applied) => Ok(StatusCode::OK),
        Ok(MutationStatus::NotFound) => {
            warn!(user_id = ?id, "update rejected: unknown user");
            let body = match id {
                Some(id) => ErrorMessage::user_not_found(id),
                None => ErrorMessage::new("user id is required."),
            };
            Err(JsonApiError::bad_request(body))
        }
        Err(e) => Err(e.into()),
    };
    outcome("update", &res);
    res
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Unknown id", body = ErrorMessage)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    let res = match state.users.remove_user(id).await {
        Ok(MutationStatus::Applied) => Ok(StatusCode::OK),
        Ok(MutationStatus::NotFound) => {
            warn!(user_id = %id, "delete rejected: unknown user");
            Err(JsonApiError::bad_request(ErrorMessage::user_not_found(id)))
        }
        Err(e) => Err(e.into()),
    };
    outcome("delete", &res);
    res
}
