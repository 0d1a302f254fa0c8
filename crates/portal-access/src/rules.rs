//! Named access rules and their evaluation.
//!
//! # Purpose
//! Maps a closed set of rule names to pure predicates over [`PortalAccess`].
//!
//! # Key invariants
//! - The rule set is a compile-time enumeration; text names are parsed once,
//!   when configuration is loaded, and unknown names are errors.
//! - Predicates have no side effects, so evaluation order never matters.
//! - Absent access fails every rule.
//!
//! # Examples
//! ```rust
//! use portal_access::{evaluate_rule, NavRule, PortalAccess, RuleRef};
//!
//! let access = PortalAccess::new("u").with_staff_workspace();
//! assert!(evaluate_rule(Some(&access), &RuleRef::from(NavRule::StaffWorkspace)));
//! assert!(!evaluate_rule(None, &RuleRef::from(NavRule::StaffWorkspace)));
//! ```
use crate::access::{FEATURE_CALLS_FOR_SERVICE, FEATURE_TIME_TRACKING, ROLE_IHARC_ADMIN};
use crate::{AccessError, AccessResult, PortalAccess};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavRule {
    AdminWorkspace,
    StaffWorkspace,
    OrgWorkspace,
    OpsFrontline,
    InventoryOps,
    ManageConsents,
    ReportCosts,
    ManageWebsite,
    ManageUsers,
    ManageOrgUsers,
    CallsForService,
    TimeTracking,
    IharcAdmin,
    ApprovedProfile,
}

impl NavRule {
    pub const ALL: [NavRule; 14] = [
        NavRule::AdminWorkspace,
        NavRule::StaffWorkspace,
        NavRule::OrgWorkspace,
        NavRule::OpsFrontline,
        NavRule::InventoryOps,
        NavRule::ManageConsents,
        NavRule::ReportCosts,
        NavRule::ManageWebsite,
        NavRule::ManageUsers,
        NavRule::ManageOrgUsers,
        NavRule::CallsForService,
        NavRule::TimeTracking,
        NavRule::IharcAdmin,
        NavRule::ApprovedProfile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NavRule::AdminWorkspace => "admin_workspace",
            NavRule::StaffWorkspace => "staff_workspace",
            NavRule::OrgWorkspace => "org_workspace",
            NavRule::OpsFrontline => "ops_frontline",
            NavRule::InventoryOps => "inventory_ops",
            NavRule::ManageConsents => "manage_consents",
            NavRule::ReportCosts => "report_costs",
            NavRule::ManageWebsite => "manage_website",
            NavRule::ManageUsers => "manage_users",
            NavRule::ManageOrgUsers => "manage_org_users",
            NavRule::CallsForService => "calls_for_service",
            NavRule::TimeTracking => "time_tracking",
            NavRule::IharcAdmin => "iharc_admin",
            NavRule::ApprovedProfile => "approved_profile",
        }
    }

    /// Predicate backing this rule.
    ///
    /// The table is a plain `match`; adding a rule without a predicate does
    /// not compile.
    pub fn predicate(self) -> fn(&PortalAccess) -> bool {
        match self {
            NavRule::AdminWorkspace => |a: &PortalAccess| a.can_access_admin_workspace,
            NavRule::StaffWorkspace => |a: &PortalAccess| a.can_access_staff_workspace,
            NavRule::OrgWorkspace => |a: &PortalAccess| a.can_access_org_workspace,
            NavRule::OpsFrontline => |a: &PortalAccess| a.can_access_ops_frontline,
            NavRule::InventoryOps => |a: &PortalAccess| a.can_access_inventory_ops,
            NavRule::ManageConsents => |a: &PortalAccess| a.can_manage_consents,
            NavRule::ReportCosts => |a: &PortalAccess| a.can_report_costs,
            NavRule::ManageWebsite => |a: &PortalAccess| a.can_manage_website,
            NavRule::ManageUsers => |a: &PortalAccess| a.can_manage_users,
            NavRule::ManageOrgUsers => |a: &PortalAccess| a.can_manage_org_users,
            NavRule::CallsForService => |a: &PortalAccess| {
                a.can_access_ops_frontline && a.has_organization_feature(FEATURE_CALLS_FOR_SERVICE)
            },
            NavRule::TimeTracking => |a: &PortalAccess| {
                a.can_access_staff_workspace && a.has_organization_feature(FEATURE_TIME_TRACKING)
            },
            NavRule::IharcAdmin => |a: &PortalAccess| a.has_iharc_role(ROLE_IHARC_ADMIN),
            NavRule::ApprovedProfile => |a: &PortalAccess| a.is_approved(),
        }
    }

    pub fn evaluate(self, access: &PortalAccess) -> bool {
        (self.predicate())(access)
    }
}

impl std::fmt::Display for NavRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NavRule {
    type Err = AccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NavRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == value)
            .ok_or_else(|| AccessError::UnknownRule(value.to_string()))
    }
}

/// Rule reference attached to navigation items and areas.
///
/// `All` requires every listed rule to pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleRef {
    One(NavRule),
    All(Vec<NavRule>),
}

impl RuleRef {
    pub fn all(rules: impl IntoIterator<Item = NavRule>) -> Self {
        RuleRef::All(rules.into_iter().collect())
    }

    pub fn rules(&self) -> &[NavRule] {
        match self {
            RuleRef::One(rule) => std::slice::from_ref(rule),
            RuleRef::All(rules) => rules,
        }
    }

    /// Parse rule names from configuration text.
    ///
    /// # Errors
    /// - [`AccessError::UnknownRule`] for the first name that is not a rule.
    /// - [`AccessError::InvalidNavigation`] for an empty list.
    pub fn parse_names<S: AsRef<str>>(names: &[S]) -> AccessResult<Self> {
        if names.is_empty() {
            return Err(AccessError::InvalidNavigation(
                "rule list must not be empty".to_string(),
            ));
        }
        let rules = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<AccessResult<Vec<NavRule>>>()?;
        Ok(match rules.as_slice() {
            [single] => RuleRef::One(*single),
            _ => RuleRef::All(rules),
        })
    }
}

impl From<NavRule> for RuleRef {
    fn from(rule: NavRule) -> Self {
        RuleRef::One(rule)
    }
}

/// Evaluate a rule reference against optional access facts.
///
/// # Returns
/// - `false` when `access` is `None`.
/// - Logical AND of every referenced rule otherwise (an empty list is `true`).
pub fn evaluate_rule(access: Option<&PortalAccess>, rule: &RuleRef) -> bool {
    let Some(access) = access else {
        return false;
    };
    rule.rules().iter().all(|rule| rule.evaluate(access))
}
