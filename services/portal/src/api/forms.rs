//! Form submission endpoint.
//!
//! Every state-changing submission goes through here: CSRF validation first,
//! then the area check for the session. Nothing is stored; an accepted
//! submission is acknowledged with `202 Accepted` for the owning workflow to
//! pick up.
use crate::api::access::{PathQuery, decision_response, parse_area, record_decision};
use crate::api::error::{ApiError, api_csrf_rejected, api_validation_error};
use crate::api::load_request_context;
use crate::api::types::FormAcceptedResponse;
use crate::app::AppState;
use crate::csrf::{CSRF_FORM_FIELD, RequestCsrf, validate_submission};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use portal_access::require_area;
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/v1/portal/areas/{area}/forms/{form}",
    tag = "portal",
    params(
        ("area" = String, Path, description = "Portal area owning the form"),
        ("form" = String, Path, description = "Form identifier"),
        ("path" = Option<String>, Query, description = "Page the form was rendered on")
    ),
    responses(
        (status = 202, description = "Submission accepted", body = FormAcceptedResponse),
        (status = 303, description = "Session may not use this area; follow Location", body = crate::api::types::AccessDecisionResponse),
        (status = 400, description = "Malformed form identifier", body = crate::api::types::ErrorResponse),
        (status = 403, description = "CSRF validation failed", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Unknown area", body = crate::api::types::ErrorResponse)
    )
)]
/// Accept an urlencoded form submission for `area`.
///
/// # Errors
/// - 403 with the fixed session-expired message when the `csrf_token` field
///   is missing or differs from the `portal_csrf` cookie. A body that is not
///   an urlencoded form carries no token and is rejected the same way.
/// - 404 for an unknown area, 400 for a malformed form identifier.
pub(crate) async fn submit_form(
    State(state): State<AppState>,
    Path((area, form)): Path<(String, String)>,
    Query(query): Query<PathQuery>,
    Extension(csrf): Extension<RequestCsrf>,
    headers: HeaderMap,
    body: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, ApiError> {
    let area = parse_area(&area)?;
    if !is_valid_form_id(&form) {
        return Err(api_validation_error("invalid form identifier"));
    }
    let fields = match body {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "form body not readable");
            HashMap::new()
        }
    };
    validate_submission(&csrf, fields.get(CSRF_FORM_FIELD).map(String::as_str))
        .map_err(|_| api_csrf_rejected())?;

    let ctx = load_request_context(&state, &headers, query.current_path()).await?;
    let decision = require_area(ctx.access(), area, &ctx.area_context());
    record_decision(area, &decision);
    if !decision.is_allowed() {
        return Ok(decision_response(&decision));
    }

    tracing::info!(area = %area, form = %form, fields = fields.len(), "form submission accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(FormAcceptedResponse {
            area: area.as_str().to_string(),
            form,
            accepted: true,
        }),
    )
        .into_response())
}

fn is_valid_form_id(form: &str) -> bool {
    !form.is_empty()
        && form.len() <= 64
        && form
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
