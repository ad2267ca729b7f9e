use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    api::state::AppState,
    domain::User,
    error::{AppError, Result},
};

pub type BearerHeader = TypedHeader<Authorization<Bearer>>;

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

async fn authenticate(state: &AppState, bearer: Option<BearerHeader>) -> Result<User> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    state.service_context.user_service
        .authenticate(bearer.token())
        .await
}

pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let user = authenticate(&state, bearer).await?;

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let user = authenticate(&state, bearer).await?;

    if !user.is_admin() {
        tracing::debug!(uid = %user.uid, path = %request.uri().path(), "Admin route refused");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Resolves the caller when a valid credential is present; otherwise the
/// request continues anonymously.
pub async fn optional_auth(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Response {
    if bearer.is_some() {
        match authenticate(&state, bearer).await {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser { user });
            }
            Err(e) => {
                tracing::debug!("Continuing anonymously: {}", e);
            }
        }
    }

    next.run(request).await
}
