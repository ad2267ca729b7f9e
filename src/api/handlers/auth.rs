use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    api::{middleware::auth::BearerHeader, state::AppState},
    domain::User,
    error::{AppError, Result},
};

/// Find-or-create the local account behind a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    responses(
        (status = 201, description = "Account provisioned", body = User),
        (status = 200, description = "Account already known", body = User),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Email belongs to another account")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
) -> Result<(StatusCode, Json<User>)> {
    let bearer = bearer.ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let (user, created) = state.service_context.user_service
        .register(bearer.token())
        .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(user)))
}
