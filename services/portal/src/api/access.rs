//! Portal access API handlers.
//!
//! # Purpose and responsibility
//! Serves the three read-side decisions the portal shell needs: where a
//! session lands, which navigation it may see, and whether it may enter an
//! area.
//!
//! # Key invariants and assumptions
//! - Every decision is computed from one [`crate::context::PortalRequestContext`]
//!   snapshot per request.
//! - Denials are redirects (`303 See Other`), never error payloads.
//! - The CSRF token returned with navigation is the one the guard attached to
//!   the request, so the rendered token always matches the cookie.
use crate::api::error::{ApiError, api_not_found};
use crate::api::load_request_context;
use crate::api::types::{AccessDecisionResponse, LandingResponse, NavigationResponse};
use crate::app::AppState;
use crate::csrf::RequestCsrf;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use portal_access::{
    AccessDecision, PUBLIC_HOME_PATH, PortalArea, filter_nav_tree, find_active_item, require_area,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Query parameter carrying the page the shell is rendering.
pub(crate) const PATH_PARAM: &str = "path";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PathQuery {
    pub path: Option<String>,
}

impl PathQuery {
    pub(crate) fn current_path(&self) -> &str {
        self.path.as_deref().unwrap_or(PUBLIC_HOME_PATH)
    }
}

#[utoipa::path(
    get,
    path = "/v1/portal/landing",
    tag = "portal",
    responses(
        (status = 200, description = "Landing path for the session", body = LandingResponse),
        (status = 500, description = "Access loader failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn landing(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LandingResponse>, ApiError> {
    let ctx = load_request_context(&state, &headers, PUBLIC_HOME_PATH).await?;
    Ok(Json(LandingResponse {
        authenticated: ctx.access().is_some(),
        landing_path: ctx.landing_path,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/portal/navigation",
    tag = "portal",
    params(
        ("path" = Option<String>, Query, description = "Current page path; remaining query parameters are matched against item constraints")
    ),
    responses(
        (status = 200, description = "Navigation visible to the session", body = NavigationResponse),
        (status = 500, description = "Access loader failure", body = crate::api::types::ErrorResponse)
    )
)]
/// Return the filtered navigation tree and the active item.
///
/// `path` names the page being rendered. Every other query parameter is
/// treated as that page's search parameters when matching item query
/// constraints.
pub(crate) async fn navigation(
    State(state): State<AppState>,
    Extension(csrf): Extension<RequestCsrf>,
    headers: HeaderMap,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let raw_path = params
        .remove(PATH_PARAM)
        .unwrap_or_else(|| PUBLIC_HOME_PATH.to_string());
    let ctx = load_request_context(&state, &headers, &raw_path).await?;

    let sections = filter_nav_tree(&state.navigation, ctx.access());
    let active_item_id =
        find_active_item(&sections, &ctx.current_path, Some(&params)).map(|item| item.id.clone());
    Ok(Json(NavigationResponse {
        sections,
        active_item_id,
        current_path: ctx.current_path,
        landing_path: ctx.landing_path,
        csrf_token: csrf.token.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/portal/areas/{area}",
    tag = "portal",
    params(
        ("area" = String, Path, description = "Portal area name, e.g. `staff` or `inventory`"),
        ("path" = Option<String>, Query, description = "Page the caller is trying to render")
    ),
    responses(
        (status = 200, description = "Access allowed", body = AccessDecisionResponse),
        (status = 303, description = "Access denied; follow Location", body = AccessDecisionResponse),
        (status = 404, description = "Unknown area", body = crate::api::types::ErrorResponse)
    )
)]
/// Decide whether the session may enter `area`.
pub(crate) async fn area_decision(
    State(state): State<AppState>,
    Path(area): Path<String>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let area = parse_area(&area)?;
    let ctx = load_request_context(&state, &headers, query.current_path()).await?;
    let decision = require_area(ctx.access(), area, &ctx.area_context());
    record_decision(area, &decision);
    Ok(decision_response(&decision))
}

pub(crate) fn parse_area(raw: &str) -> Result<PortalArea, ApiError> {
    raw.parse::<PortalArea>()
        .map_err(|_| api_not_found("unknown portal area"))
}

pub(crate) fn record_decision(area: PortalArea, decision: &AccessDecision) {
    let label = match decision {
        AccessDecision::Allowed => "allowed",
        AccessDecision::Redirect { reason, .. } => reason.as_str(),
    };
    metrics::counter!("portal_access_decisions_total", "decision" => label).increment(1);
    tracing::debug!(area = %area, decision = label, "area access decided");
}

/// Render a decision: 200 when allowed, 303 with `Location` otherwise.
pub(crate) fn decision_response(decision: &AccessDecision) -> Response {
    let body = Json(AccessDecisionResponse::from(decision));
    match decision.redirect_path() {
        None => (StatusCode::OK, body).into_response(),
        Some(path) => (StatusCode::SEE_OTHER, [(LOCATION, path.to_string())], body).into_response(),
    }
}
