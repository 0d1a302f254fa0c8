//! System/health API handlers.
//!
//! # Key invariants
//! - Health checks must be fast and side-effect free.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Portal health", body = HealthStatus),
        (status = 500, description = "Access loader unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return portal health status.
///
/// Checks the access loader and returns `ok` with the backend name if healthy.
///
/// # Errors
/// - Returns 500 if the loader health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.loader.health_check().await {
        return Err(api_internal("access loader unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        backend: state.loader.backend_name().to_string(),
        api_version: state.api_version.clone(),
    }))
}
