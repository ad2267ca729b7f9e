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
    domain::{Category, CreateNoticeRequest, Notice, Page, PageRequest, UpdateNoticeRequest},
    error::Result,
    service::NoticeQuery,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNoticesQuery {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, 1 to 100.
    pub per_page: Option<i64>,
    #[serde(default)]
    pub include_expired: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubcategoriesQuery {
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubcategoriesResponse {
    pub subcategories: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/notices",
    tag = "notices",
    params(ListNoticesQuery),
    responses(
        (status = 200, description = "Active, unexpired notices", body = Page<Notice>),
        (status = 400, description = "Invalid filter or paging parameters")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListNoticesQuery>,
) -> Result<Json<Page<Notice>>> {
    let page = PageRequest::new(params.page, params.per_page)?;
    let query = NoticeQuery {
        category: params.category,
        subcategory: params.subcategory,
        search: params.search,
        include_expired: params.include_expired,
    };

    let notices = state.service_context.notice_service.list(query, page).await?;

    Ok(Json(notices))
}

#[utoipa::path(
    get,
    path = "/api/v1/notices/{id}",
    tag = "notices",
    params(("id" = i64, Path, description = "Notice id")),
    responses(
        (status = 200, description = "The notice", body = Notice),
        (status = 404, description = "Missing, or expired and the caller is not an admin")
    )
)]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<Notice>> {
    let viewer = user.as_ref().map(|Extension(current)| &current.user);
    let notice = state.service_context.notice_service.get(id, viewer).await?;

    Ok(Json(notice))
}

#[utoipa::path(
    post,
    path = "/api/v1/notices",
    tag = "notices",
    request_body = CreateNoticeRequest,
    responses(
        (status = 201, description = "Notice created", body = Notice),
        (status = 400, description = "Invalid notice"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(request): ApiJson<CreateNoticeRequest>,
) -> Result<(StatusCode, Json<Notice>)> {
    let notice = state.service_context.notice_service
        .create(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(notice)))
}

#[utoipa::path(
    put,
    path = "/api/v1/notices/{id}",
    tag = "notices",
    params(("id" = i64, Path, description = "Notice id")),
    request_body = UpdateNoticeRequest,
    responses(
        (status = 200, description = "Notice updated", body = Notice),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Notice not found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateNoticeRequest>,
) -> Result<Json<Notice>> {
    let notice = state.service_context.notice_service.update(id, request).await?;

    Ok(Json(notice))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notices/{id}",
    tag = "notices",
    params(("id" = i64, Path, description = "Notice id")),
    responses(
        (status = 204, description = "Notice deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Notice not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.service_context.notice_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/notices/categories/subcategories",
    tag = "notices",
    params(SubcategoriesQuery),
    responses((status = 200, description = "Distinct subcategories", body = SubcategoriesResponse))
)]
pub async fn subcategories(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SubcategoriesQuery>,
) -> Result<Json<SubcategoriesResponse>> {
    let subcategories = state.service_context.notice_service
        .subcategories(params.category)
        .await?;

    Ok(Json(SubcategoriesResponse { subcategories }))
}
