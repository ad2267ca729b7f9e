use utoipa::OpenApi;

use crate::domain;

use super::handlers::{admin, auth, notices, users};

/// Served at `/api-docs/openapi.json` and rendered by Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Virtual Notice Board API"),
    paths(
        auth::register,
        notices::list, notices::get, notices::create, notices::update, notices::delete,
        notices::subcategories,
        users::me, users::update_me, users::list, users::create, users::update,
        admin::list_users, admin::get_user, admin::update_role, admin::delete_user,
        admin::list_notices, admin::approve_notice, admin::reject_notice, admin::bulk_approve,
        admin::delete_notice, admin::stats,
    ),
    components(
        schemas(
            domain::User, domain::Role, domain::CreateUserRequest, domain::UpdateUserRequest,
            domain::Notice, domain::Category, domain::ApprovalStatus,
            domain::CreateNoticeRequest, domain::UpdateNoticeRequest,
            domain::RejectNoticeRequest, domain::BulkApproveRequest,
            domain::SystemStats, domain::UsersByRole,
            notices::SubcategoriesResponse,
            admin::RoleChangeRequest, admin::RoleChangeResponse,
            admin::ModerationResponse, admin::BulkApproveResponse,
        )
    ),
    tags(
        (name = "auth", description = "Account provisioning"),
        (name = "notices", description = "Public notice board"),
        (name = "users", description = "Profiles and user management"),
        (name = "admin", description = "Moderation and reporting"),
    )
)]
pub struct ApiDoc;
