use axum::body::Body;
use axum::http::header::SET_COOKIE;
use portal::app::{AppState, build_router};
use portal::loader::PortalAccessLoader;
use portal::loader::memory::InMemoryAccessLoader;
use portal_access::{PortalAccess, default_navigation};
use std::collections::HashMap;
use std::sync::Arc;

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn app_with_loader(loader: Arc<dyn PortalAccessLoader + Send + Sync>) -> TestApp {
    let state = AppState {
        api_version: "v1".to_string(),
        navigation: Arc::new(default_navigation()),
        loader,
    };
    build_router(state).into_service()
}

pub fn app_with_sessions(sessions: Vec<(&str, PortalAccess)>) -> TestApp {
    let fixtures: HashMap<String, PortalAccess> = sessions
        .into_iter()
        .map(|(id, access)| (id.to_string(), access))
        .collect();
    app_with_loader(Arc::new(InMemoryAccessLoader::new(fixtures)))
}

/// Value of the `portal_csrf` cookie set on `response`, if any.
pub fn issued_csrf(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| value.strip_prefix("portal_csrf="))
        .and_then(|rest| rest.split(';').next())
        .map(str::to_string)
}
