pub mod docs;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use docs::ApiDoc;
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let cors = cors_layer(&settings.server.cors_origins);
    let app_state = AppState::new(service_context);

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .nest("/api/v1", api_routes(app_state.clone()))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .nest("/notices", notice_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

fn notice_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handlers::notices::list))
        .route("/:id", get(handlers::notices::get))
        .route("/categories/subcategories", get(handlers::notices::subcategories))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::optional_auth,
        ));

    let managed = Router::new()
        .route("/", post(handlers::notices::create))
        .route("/:id", put(handlers::notices::update).delete(handlers::notices::delete))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ));

    public.merge(managed)
}

fn user_routes(state: AppState) -> Router<AppState> {
    let own = Router::new()
        .route("/me", get(handlers::users::me).put(handlers::users::update_me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let managed = Router::new()
        .route("/", get(handlers::users::list).post(handlers::users::create))
        .route("/:uid", put(handlers::users::update))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ));

    own.merge(managed)
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/users/:uid", get(handlers::admin::get_user).delete(handlers::admin::delete_user))
        .route("/users/:uid/role", put(handlers::admin::update_role))
        .route("/notices", get(handlers::admin::list_notices))
        .route("/notices/bulk-approve", post(handlers::admin::bulk_approve))
        .route("/notices/:id", axum::routing::delete(handlers::admin::delete_notice))
        .route("/notices/:id/approve", put(handlers::admin::approve_notice))
        .route("/notices/:id/reject", put(handlers::admin::reject_notice))
        .route("/stats", get(handlers::admin::stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
