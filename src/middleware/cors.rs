use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use super::auth::INIT_DATA_HEADER;

/// The mini-app is served from the Telegram web-app host, never from this origin.
pub fn mini_app_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(INIT_DATA_HEADER),
        ])
        .allow_origin(Any)
}
