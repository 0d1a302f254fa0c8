//! Access loading seam.
//!
//! # Purpose
//! Resolving a session into [`PortalAccess`] belongs to an external
//! collaborator (authentication plus role and feature lookups). The service
//! only depends on this trait.
//!
//! # Notes
//! The in-memory loader backs local development and tests from configured
//! fixtures.
use async_trait::async_trait;
use portal_access::PortalAccess;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("access backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type LoaderResult<T> = Result<T, LoaderError>;

#[async_trait]
pub trait PortalAccessLoader: Send + Sync {
    /// Resolve the access facts for a session, or `None` when the session is
    /// unknown or not yet linked to a profile.
    async fn load_portal_access(&self, session_id: &str) -> LoaderResult<Option<PortalAccess>>;

    async fn health_check(&self) -> LoaderResult<()>;
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_errors_convert_to_unexpected() {
        let err: LoaderError = anyhow::anyhow!("directory timeout").into();
        assert!(matches!(err, LoaderError::Unexpected(_)));
        assert_eq!(err.to_string(), "directory timeout");
    }
}
