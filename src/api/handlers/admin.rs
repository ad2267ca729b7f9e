use axum::{
    extract::State,
    http::StatusCode,
    Extension,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        extract::{ApiJson, ApiPath, ApiQuery},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{
        ApprovalStatus, BulkApproveRequest, Notice, Page, PageRequest, RejectNoticeRequest,
        Role, SystemStats, User,
    },
    error::Result,
    service::AdminNoticeQuery,
};

use super::users::ListUsersQuery;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminNoticesQuery {
    /// Defaults to true for the admin view.
    pub include_expired: Option<bool>,
    pub approval_status: Option<ApprovalStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleChangeRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleChangeResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModerationResponse {
    pub message: String,
    pub notice: Notice,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkApproveResponse {
    pub message: String,
    pub approved_count: u64,
    pub total_requested: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(ListUsersQuery),
    responses((status = 200, description = "Users", body = Page<User>))
)]
pub async fn list_users(
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
    get,
    path = "/api/v1/admin/users/{uid}",
    tag = "admin",
    params(("uid" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
) -> Result<Json<User>> {
    let user = state.service_context.user_service.get(&uid).await?;

    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{uid}/role",
    tag = "admin",
    params(("uid" = String, Path, description = "User id")),
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role changed", body = RoleChangeResponse),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
    ApiJson(request): ApiJson<RoleChangeRequest>,
) -> Result<Json<RoleChangeResponse>> {
    let user = state.service_context.user_service
        .change_role(&uid, request.role)
        .await?;

    Ok(Json(RoleChangeResponse {
        message: format!("User role updated to {}", user.role),
        user,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{uid}",
    tag = "admin",
    params(("uid" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Target is an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
) -> Result<StatusCode> {
    state.service_context.user_service.delete(&uid).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/notices",
    tag = "admin",
    params(AdminNoticesQuery),
    responses((status = 200, description = "All notices, inactive included", body = Page<Notice>))
)]
pub async fn list_notices(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AdminNoticesQuery>,
) -> Result<Json<Page<Notice>>> {
    let page = PageRequest::new(params.page, params.per_page)?;
    let query = AdminNoticeQuery {
        include_expired: params.include_expired.unwrap_or(true),
        approval_status: params.approval_status,
    };

    let notices = state.service_context.admin_service
        .list_notices(query, page)
        .await?;

    Ok(Json(notices))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/notices/{id}/approve",
    tag = "admin",
    params(("id" = i64, Path, description = "Notice id")),
    responses(
        (status = 200, description = "Notice approved", body = ModerationResponse),
        (status = 404, description = "Notice not found"),
        (status = 409, description = "Notice is not pending")
    )
)]
pub async fn approve_notice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ModerationResponse>> {
    let notice = state.service_context.admin_service
        .approve(id, &current.user)
        .await?;

    Ok(Json(ModerationResponse {
        message: "Notice approved successfully".to_string(),
        notice,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/notices/{id}/reject",
    tag = "admin",
    params(("id" = i64, Path, description = "Notice id")),
    request_body = RejectNoticeRequest,
    responses(
        (status = 200, description = "Notice rejected", body = ModerationResponse),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Notice not found"),
        (status = 409, description = "Notice is not pending")
    )
)]
pub async fn reject_notice(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<RejectNoticeRequest>,
) -> Result<Json<ModerationResponse>> {
    let notice = state.service_context.admin_service
        .reject(id, &current.user, &request.reason)
        .await?;

    Ok(Json(ModerationResponse {
        message: "Notice rejected successfully".to_string(),
        notice,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notices/bulk-approve",
    tag = "admin",
    request_body = BulkApproveRequest,
    responses(
        (status = 200, description = "Pending notices approved", body = BulkApproveResponse),
        (status = 404, description = "None of the ids exist")
    )
)]
pub async fn bulk_approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(request): ApiJson<BulkApproveRequest>,
) -> Result<Json<BulkApproveResponse>> {
    let outcome = state.service_context.admin_service
        .bulk_approve(&request.notice_ids, &current.user)
        .await?;

    Ok(Json(BulkApproveResponse {
        message: format!("Approved {} notices", outcome.approved),
        approved_count: outcome.approved,
        total_requested: request.notice_ids.len(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/notices/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Notice id")),
    responses(
        (status = 204, description = "Notice deleted"),
        (status = 404, description = "Notice not found")
    )
)]
pub async fn delete_notice(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.service_context.notice_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "admin",
    responses((status = 200, description = "System statistics", body = SystemStats))
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<SystemStats>> {
    let stats = state.service_context.admin_service.stats().await?;

    Ok(Json(stats))
}
