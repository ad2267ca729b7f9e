use axum::{
    extract::State,
    http::StatusCode,
    Extension,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    api::{
        extract::{ApiJson, ApiPath, ApiQuery},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{CreateUserRequest, Page, PageRequest, Role, UpdateUserRequest, User},
    error::Result,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Reading one's own profile doubles as a login heartbeat.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Caller's profile", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service
        .profile(&current.user.uid)
        .await?;

    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile; role changes by non-admins are ignored", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(update): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service
        .update_self(&current.user, update)
        .await?;

    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = Page<User>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListUsersQuery>,
) -> Result<Json<Page<User>>> {
    let page = PageRequest::new(params.page, params.per_page)?;
    let users = state.service_context.user_service
        .list(params.role, page)
        .await?;

    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Duplicate uid or email")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.service_context.user_service.create(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{uid}",
    tag = "users",
    params(("uid" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
    ApiJson(update): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service.update(&uid, update).await?;

    Ok(Json(user))
}
