//! Area guards: render or redirect.
//!
//! # Purpose
//! Protected layouts ask whether the caller may enter an area of the portal.
//! The answer is either [`AccessDecision::Allowed`] or a redirect target.
//!
//! # Key invariants
//! - Missing identity short-circuits to the login page before any rule runs.
//! - A redirect path never equals the current path, so guards cannot loop on
//!   themselves.
//!
//! # Examples
//! ```rust
//! use portal_access::{require_area, AccessDecision, AreaContext, PortalAccess, PortalArea};
//!
//! let access = PortalAccess::new("u").with_staff_workspace();
//! let ctx = AreaContext::new("/ops/admin", "/ops/today");
//! let decision = require_area(Some(&access), PortalArea::Admin, &ctx);
//! assert_eq!(decision.redirect_path(), Some("/ops/today"));
//! ```
use crate::landing::STAFF_HOME_PATH;
use crate::paths::{LOGIN_PATH, PUBLIC_HOME_PATH, clean_pathname, login_redirect};
use crate::{AccessError, NavRule, PortalAccess, RuleRef, evaluate_rule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalArea {
    Admin,
    Staff,
    Organization,
    Inventory,
    Consents,
    Costs,
    CallsForService,
    TimeTracking,
    Website,
    Client,
}

impl PortalArea {
    pub const ALL: [PortalArea; 10] = [
        PortalArea::Admin,
        PortalArea::Staff,
        PortalArea::Organization,
        PortalArea::Inventory,
        PortalArea::Consents,
        PortalArea::Costs,
        PortalArea::CallsForService,
        PortalArea::TimeTracking,
        PortalArea::Website,
        PortalArea::Client,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PortalArea::Admin => "admin",
            PortalArea::Staff => "staff",
            PortalArea::Organization => "organization",
            PortalArea::Inventory => "inventory",
            PortalArea::Consents => "consents",
            PortalArea::Costs => "costs",
            PortalArea::CallsForService => "calls_for_service",
            PortalArea::TimeTracking => "time_tracking",
            PortalArea::Website => "website",
            PortalArea::Client => "client",
        }
    }

    pub fn rule(self) -> RuleRef {
        match self {
            PortalArea::Admin => RuleRef::One(NavRule::AdminWorkspace),
            PortalArea::Staff => RuleRef::One(NavRule::StaffWorkspace),
            PortalArea::Organization => RuleRef::One(NavRule::OrgWorkspace),
            PortalArea::Inventory => {
                RuleRef::all([NavRule::StaffWorkspace, NavRule::InventoryOps])
            }
            PortalArea::Consents => RuleRef::One(NavRule::ManageConsents),
            PortalArea::Costs => RuleRef::One(NavRule::ReportCosts),
            PortalArea::CallsForService => RuleRef::One(NavRule::CallsForService),
            PortalArea::TimeTracking => RuleRef::One(NavRule::TimeTracking),
            PortalArea::Website => {
                RuleRef::all([NavRule::AdminWorkspace, NavRule::ManageWebsite])
            }
            PortalArea::Client => RuleRef::One(NavRule::ApprovedProfile),
        }
    }

    /// Where a denied caller goes first; `None` means the landing path.
    ///
    /// Every natural target is the staff home, so [`require_area`] only
    /// offers it to callers who pass the staff workspace rule.
    pub fn natural_target(self) -> Option<&'static str> {
        match self {
            PortalArea::Admin
            | PortalArea::Inventory
            | PortalArea::Consents
            | PortalArea::Costs
            | PortalArea::CallsForService
            | PortalArea::TimeTracking
            | PortalArea::Website => Some(STAFF_HOME_PATH),
            PortalArea::Staff | PortalArea::Organization | PortalArea::Client => None,
        }
    }
}

impl std::fmt::Display for PortalArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PortalArea {
    type Err = AccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PortalArea::ALL
            .into_iter()
            .find(|area| area.as_str() == value)
            .ok_or_else(|| AccessError::UnknownArea(value.to_string()))
    }
}

/// Request facts an area guard needs besides the access object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaContext {
    pub current_path: String,
    pub landing_path: String,
}

impl AreaContext {
    pub fn new(current_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            current_path: current_path.into(),
            landing_path: landing_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Unauthenticated,
    Forbidden,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::Unauthenticated => "unauthenticated",
            DenialReason::Forbidden => "forbidden",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Redirect { path: String, reason: DenialReason },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Redirect { path, .. } => Some(path),
        }
    }
}

/// Decide whether the caller may enter `area`.
///
/// # Returns
/// - Login redirect carrying `current_path` when `access` is `None`.
/// - [`AccessDecision::Allowed`] when the area's rule passes.
/// - Otherwise a redirect to the first of: the area's natural target, the
///   landing path, `/`, `/login` that differs from the current path.
pub fn require_area(
    access: Option<&PortalAccess>,
    area: PortalArea,
    ctx: &AreaContext,
) -> AccessDecision {
    if access.is_none() {
        return AccessDecision::Redirect {
            path: login_redirect(&ctx.current_path),
            reason: DenialReason::Unauthenticated,
        };
    }
    if evaluate_rule(access, &area.rule()) {
        return AccessDecision::Allowed;
    }
    AccessDecision::Redirect {
        path: fallback_target(access, area, ctx),
        reason: DenialReason::Forbidden,
    }
}

fn fallback_target(access: Option<&PortalAccess>, area: PortalArea, ctx: &AreaContext) -> String {
    let current = clean_pathname(&ctx.current_path);
    let candidates = area
        .natural_target()
        .filter(|_| evaluate_rule(access, &PortalArea::Staff.rule()))
        .into_iter()
        .chain([ctx.landing_path.as_str(), PUBLIC_HOME_PATH, LOGIN_PATH]);
    for candidate in candidates {
        if candidate.trim().is_empty() {
            continue;
        }
        if clean_pathname(candidate) != current {
            return candidate.to_string();
        }
    }
    // `/` and `/login` never normalize to the same path, so one of them
    // always differs from the current path.
    LOGIN_PATH.to_string()
}
