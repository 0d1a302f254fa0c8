//! Portal HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared helper that turns a request
//! into a [`PortalRequestContext`].
pub mod access;
pub mod error;
pub mod forms;
pub mod openapi;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_internal};
use crate::app::AppState;
use crate::context::{PortalRequestContext, get_portal_request_context};
use axum::http::HeaderMap;

pub(crate) async fn load_request_context(
    state: &AppState,
    headers: &HeaderMap,
    raw_path: &str,
) -> Result<PortalRequestContext, ApiError> {
    get_portal_request_context(state.loader.as_ref(), headers, raw_path)
        .await
        .map_err(|err| api_internal("failed to load portal access", &err))
}
