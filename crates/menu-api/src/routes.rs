//! Router construction

use std::path::Path;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use menu_shared::config::HttpSettings;

use crate::handlers::{health, menus};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let http = state.config.http.clone();

    let menu_routes = Router::new()
        .route("/api/menus", get(menus::get_menus).post(menus::create_menu))
        .route("/api/menus/", get(menus::get_menus).post(menus::create_menu))
        .route("/api/menus/{id}", put(menus::update_menu).delete(menus::delete_menu))
        .route("/api/menus/{id}/reorder", patch(menus::reorder_menu))
        .route("/api/menus/{id}/move", patch(menus::move_menu));

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .merge(menu_routes);

    if let Some(docs_dir) = &http.docs_dir {
        router = router.route_service("/openapi.json", ServeFile::new(Path::new(docs_dir).join("openapi.json")));
    }
    if let Some(static_dir) = &http.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true));
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors_layer(&http))
            .layer(TimeoutLayer::new(http.request_timeout())),
    )
}

/// Empty origin list allows any origin.
fn cors_layer(http: &HttpSettings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION]);

    if http.cors_allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = http
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
