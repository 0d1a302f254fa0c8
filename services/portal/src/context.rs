//! Per-request portal context.
//!
//! Bundles the caller's access facts with the normalized current path and
//! their landing path, so handlers make every decision from one snapshot.
use crate::cookies::read_cookie;
use crate::loader::{LoaderResult, PortalAccessLoader};
use axum::http::HeaderMap;
use portal_access::{AreaContext, PortalAccess, clean_pathname, resolve_landing_path};

pub const SESSION_COOKIE_NAME: &str = "portal_session";

#[derive(Debug, Clone)]
pub struct PortalRequestContext {
    pub portal_access: Option<PortalAccess>,
    pub landing_path: String,
    pub current_path: String,
}

impl PortalRequestContext {
    pub fn new(portal_access: Option<PortalAccess>, raw_path: &str) -> Self {
        let landing_path = resolve_landing_path(portal_access.as_ref()).to_string();
        Self {
            portal_access,
            landing_path,
            current_path: clean_pathname(raw_path),
        }
    }

    pub fn access(&self) -> Option<&PortalAccess> {
        self.portal_access.as_ref()
    }

    pub fn area_context(&self) -> AreaContext {
        AreaContext::new(self.current_path.clone(), self.landing_path.clone())
    }
}

/// Load the request context for the session cookie in `headers`.
///
/// A missing session cookie yields a context without access; only the loader
/// can fail.
pub async fn get_portal_request_context(
    loader: &(dyn PortalAccessLoader + Send + Sync),
    headers: &HeaderMap,
    raw_path: &str,
) -> LoaderResult<PortalRequestContext> {
    let access = match read_cookie(headers, SESSION_COOKIE_NAME) {
        Some(session_id) if !session_id.is_empty() => {
            loader.load_portal_access(session_id).await?
        }
        _ => None,
    };
    Ok(PortalRequestContext::new(access, raw_path))
}
