//! Portal HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Layer order matters: the trace layer wraps everything, and the CSRF guard
//! wraps every route, so the token exists before any handler runs.
use crate::api;
use crate::csrf;
use crate::loader::PortalAccessLoader;
use crate::observability;
use axum::Router;
use axum::http::StatusCode;
use portal_access::NavSection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub navigation: Arc<Vec<NavSection>>,
    pub loader: Arc<dyn PortalAccessLoader + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                path = %request.uri().path(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/portal/landing",
            axum::routing::get(api::access::landing),
        )
        .route(
            "/v1/portal/navigation",
            axum::routing::get(api::access::navigation),
        )
        .route(
            "/v1/portal/areas/:area",
            axum::routing::get(api::access::area_decision),
        )
        .route(
            "/v1/portal/areas/:area/forms/:form",
            axum::routing::post(api::forms::submit_form),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::openapi_json),
        )
        .route("/favicon.ico", axum::routing::get(static_placeholder))
        .route("/static/*asset", axum::routing::get(static_placeholder))
        .layer(axum::middleware::from_fn(csrf::csrf_guard))
        .layer(trace_layer)
        .with_state(state)
}

// Assets are served by the fronting proxy; these routes only keep the paths
// answerable in local runs.
async fn static_placeholder() -> StatusCode {
    StatusCode::NO_CONTENT
}
