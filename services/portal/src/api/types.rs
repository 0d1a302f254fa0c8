//! HTTP API request/response types.
//!
//! # Purpose
//! Defines payload shapes for the portal access API and OpenAPI schema
//! generation. Types owned by `portal-access` are documented as opaque objects.
use portal_access::{AccessDecision, NavSection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
    pub api_version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct LandingResponse {
    pub landing_path: String,
    pub authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AccessDecisionResponse {
    pub allowed: bool,
    pub redirect_path: Option<String>,
    pub reason: Option<String>,
}

impl From<&AccessDecision> for AccessDecisionResponse {
    fn from(decision: &AccessDecision) -> Self {
        match decision {
            AccessDecision::Allowed => Self {
                allowed: true,
                redirect_path: None,
                reason: None,
            },
            AccessDecision::Redirect { path, reason } => Self {
                allowed: false,
                redirect_path: Some(path.clone()),
                reason: Some(reason.as_str().to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NavigationResponse {
    #[schema(value_type = Vec<Object>)]
    pub sections: Vec<NavSection>,
    pub active_item_id: Option<String>,
    pub current_path: String,
    pub landing_path: String,
    pub csrf_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct FormAcceptedResponse {
    pub area: String,
    pub form: String,
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_access::DenialReason;

    #[test]
    fn decision_response_mirrors_redirect() {
        let allowed = AccessDecisionResponse::from(&AccessDecision::Allowed);
        assert!(allowed.allowed);
        assert!(allowed.redirect_path.is_none());

        let denied = AccessDecisionResponse::from(&AccessDecision::Redirect {
            path: "/ops/today".to_string(),
            reason: DenialReason::Forbidden,
        });
        assert!(!denied.allowed);
        assert_eq!(denied.redirect_path.as_deref(), Some("/ops/today"));
        assert_eq!(denied.reason.as_deref(), Some("forbidden"));
    }
}
