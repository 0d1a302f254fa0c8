//! Resolved portal access facts for a single request.
//!
//! # Purpose
//! Describes who the caller is: profile, role sets, capability flags, and the
//! feature toggles enabled for their organization.
//!
//! # How it fits
//! An external loader resolves a [`PortalAccess`] once per request. The rule
//! engine only reads it; nothing in this crate derives or mutates flags.
//!
//! # Key invariants
//! - Capability flags are authoritative inputs and are never recomputed here.
//! - Role and feature sets are unordered; `BTreeSet` keeps serialization stable.
//! - Absent access is `Option<&PortalAccess>::None`, never a default value.
//!
//! # Examples
//! ```rust
//! use portal_access::{PortalAccess, FEATURE_TIME_TRACKING};
//!
//! let access = PortalAccess::new("user-1")
//!     .with_staff_workspace()
//!     .with_organization_feature(FEATURE_TIME_TRACKING);
//! assert!(access.has_organization_feature("time_tracking"));
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Organization feature enabling the calls-for-service queue.
pub const FEATURE_CALLS_FOR_SERVICE: &str = "calls_for_service";
/// Organization feature enabling staff time tracking.
pub const FEATURE_TIME_TRACKING: &str = "time_tracking";
/// IHARC role granting platform-wide administration.
pub const ROLE_IHARC_ADMIN: &str = "iharc_admin";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliationType {
    #[default]
    CommunityMember,
    AgencyPartner,
    GovernmentPartner,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalProfile {
    pub id: String,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub affiliation_type: AffiliationType,
    #[serde(default)]
    pub organization_id: Option<i64>,
}

/// Request-scoped access facts.
///
/// # Invariants
/// - Treated as immutable once loaded; builder helpers consume `self`.
/// - Missing flags deserialize as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalAccess {
    pub user_id: String,
    #[serde(default)]
    pub profile: PortalProfile,
    #[serde(default)]
    pub portal_roles: BTreeSet<String>,
    #[serde(default)]
    pub iharc_roles: BTreeSet<String>,
    #[serde(default)]
    pub can_access_admin_workspace: bool,
    #[serde(default)]
    pub can_access_staff_workspace: bool,
    #[serde(default)]
    pub can_access_org_workspace: bool,
    #[serde(default)]
    pub can_access_ops_frontline: bool,
    #[serde(default)]
    pub can_access_inventory_ops: bool,
    #[serde(default)]
    pub can_manage_consents: bool,
    #[serde(default)]
    pub can_report_costs: bool,
    #[serde(default)]
    pub can_manage_website: bool,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_manage_org_users: bool,
    #[serde(default)]
    pub organization_features: BTreeSet<String>,
}

impl PortalAccess {
    /// Create access facts for a user with every flag cleared.
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            profile: PortalProfile {
                id: format!("profile-{user_id}"),
                ..PortalProfile::default()
            },
            user_id,
            ..Self::default()
        }
    }

    pub fn has_iharc_role(&self, role: &str) -> bool {
        self.iharc_roles.contains(role)
    }

    pub fn has_organization_feature(&self, feature: &str) -> bool {
        self.organization_features.contains(feature)
    }

    pub fn is_approved(&self) -> bool {
        self.profile.approval_status == ApprovalStatus::Approved
    }

    pub fn with_admin_workspace(mut self) -> Self {
        self.can_access_admin_workspace = true;
        self
    }

    pub fn with_staff_workspace(mut self) -> Self {
        self.can_access_staff_workspace = true;
        self
    }

    pub fn with_org_workspace(mut self) -> Self {
        self.can_access_org_workspace = true;
        self
    }

    pub fn with_ops_frontline(mut self) -> Self {
        self.can_access_ops_frontline = true;
        self
    }

    pub fn with_approval(mut self, status: ApprovalStatus) -> Self {
        self.profile.approval_status = status;
        self
    }

    pub fn with_portal_role(mut self, role: impl Into<String>) -> Self {
        self.portal_roles.insert(role.into());
        self
    }

    pub fn with_iharc_role(mut self, role: impl Into<String>) -> Self {
        self.iharc_roles.insert(role.into());
        self
    }

    pub fn with_organization_feature(mut self, feature: impl Into<String>) -> Self {
        self.organization_features.insert(feature.into());
        self
    }
}
