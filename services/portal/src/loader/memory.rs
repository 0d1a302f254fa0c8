//! In-memory access loader.
//!
//! # Purpose
//! Serves [`PortalAccess`] fixtures keyed by session id. State lives in a
//! `HashMap` behind a `tokio::sync::RwLock` and is lost on restart.
//!
//! # Notes
//! Sessions can be added at runtime, which tests use to simulate sign-in.
use super::{LoaderResult, PortalAccessLoader};
use async_trait::async_trait;
use portal_access::PortalAccess;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessLoader {
    sessions: Arc<RwLock<HashMap<String, PortalAccess>>>,
}

impl InMemoryAccessLoader {
    pub fn new(fixtures: HashMap<String, PortalAccess>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(fixtures)),
        }
    }

    pub async fn insert_session(&self, session_id: impl Into<String>, access: PortalAccess) {
        self.sessions.write().await.insert(session_id.into(), access);
    }
}

#[async_trait]
impl PortalAccessLoader for InMemoryAccessLoader {
    async fn load_portal_access(&self, session_id: &str) -> LoaderResult<Option<PortalAccess>> {
        let access = self.sessions.read().await.get(session_id).cloned();
        tracing::debug!(found = access.is_some(), "portal access lookup");
        Ok(access)
    }

    async fn health_check(&self) -> LoaderResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_resolve_by_session() {
        let mut fixtures = HashMap::new();
        fixtures.insert(
            "s-staff".to_string(),
            PortalAccess::new("staff-1").with_staff_workspace(),
        );
        let loader = InMemoryAccessLoader::new(fixtures);

        let access = loader
            .load_portal_access("s-staff")
            .await
            .expect("load")
            .expect("session");
        assert_eq!(access.user_id, "staff-1");
        assert!(loader.load_portal_access("missing").await.expect("load").is_none());
        assert_eq!(loader.backend_name(), "memory");
    }

    #[tokio::test]
    async fn sessions_can_be_added_at_runtime() {
        let loader = InMemoryAccessLoader::default();
        loader
            .insert_session("s-1", PortalAccess::new("client-1"))
            .await;
        assert!(loader.load_portal_access("s-1").await.expect("load").is_some());
        loader.health_check().await.expect("healthy");
    }
}
