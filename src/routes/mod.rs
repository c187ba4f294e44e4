pub mod admin;
pub mod applications;
pub mod health;
pub mod hierarchy;
pub mod me;
pub mod super_admin;
pub mod telegram;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    auth::{require_super_admin, require_telegram_user},
    cors::mini_app_cors,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Assembles the full HTTP surface over `state`.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/webhook/telegram", post(telegram::handle_webhook));

    let public_api = Router::new()
        .route("/api/me", get(me::get_me))
        .route("/api/register", post(me::register))
        .route("/api/me/applications", get(me::my_applications))
        .route("/api/regions", get(hierarchy::list_regions))
        .route("/api/regions/:id/districts", get(hierarchy::list_districts))
        .route("/api/districts/:id/schools", get(hierarchy::list_schools))
        .route("/api/schools/:id/vacancies", get(hierarchy::list_vacancies))
        .route("/api/vacancies/:id", get(hierarchy::get_vacancy))
        .route(
            "/api/vacancies/:id/applications",
            post(applications::submit_application),
        )
        .route_layer(from_fn_with_state(
            RateLimiter::per_second(config.public_rps),
            rps_middleware,
        ))
        .route_layer(from_fn_with_state(state.clone(), require_telegram_user));

    let admin_api = Router::new()
        .route("/api/admin/scope", get(admin::get_scope))
        .route("/api/admin/applications", get(admin::list_applications))
        .route(
            "/api/admin/applications/:id/decision",
            post(admin::decide),
        )
        .route(
            "/api/admin/applications/:id/attachments",
            get(admin::list_attachments),
        )
        .route(
            "/api/admin/vacancies",
            get(admin::list_vacancies).post(admin::create_vacancy),
        )
        .route(
            "/api/admin/vacancies/:id",
            patch(admin::update_vacancy).delete(admin::delete_vacancy),
        )
        .route_layer(from_fn_with_state(
            RateLimiter::per_second(config.admin_rps),
            rps_middleware,
        ))
        .route_layer(from_fn_with_state(state.clone(), require_telegram_user));

    let super_admin_api = Router::new()
        .route(
            "/api/super-admin/admins",
            get(super_admin::admin_overview).post(super_admin::assign_admin),
        )
        .route(
            "/api/super-admin/admins/:user_id",
            axum::routing::delete(super_admin::revoke_admin),
        )
        .route(
            "/api/super-admin/schools",
            get(super_admin::list_schools).post(super_admin::create_school),
        )
        .route(
            "/api/super-admin/schools/:id",
            patch(super_admin::update_school).delete(super_admin::delete_school),
        )
        .route(
            "/api/super-admin/districts",
            post(super_admin::create_district),
        )
        .route(
            "/api/super-admin/districts/:id",
            patch(super_admin::update_district).delete(super_admin::delete_district),
        )
        .route_layer(from_fn_with_state(
            RateLimiter::per_second(config.admin_rps),
            rps_middleware,
        ))
        .route_layer(from_fn_with_state(state.clone(), require_super_admin))
        .route_layer(from_fn_with_state(state.clone(), require_telegram_user));

    base_routes
        .merge(public_api)
        .merge(admin_api)
        .merge(super_admin_api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(mini_app_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}
