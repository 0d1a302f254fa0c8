//! Landing path resolution.
//!
//! The ladder is fixed: admin, staff, organization, approved client, then
//! the public home page. The first rung the caller qualifies for wins.
use crate::paths::PUBLIC_HOME_PATH;
use crate::{NavRule, PortalAccess};

pub const ADMIN_HOME_PATH: &str = "/ops/admin";
pub const STAFF_HOME_PATH: &str = "/ops/today";
pub const ORG_HOME_PATH: &str = "/ops/org";
pub const CLIENT_HOME_PATH: &str = "/home";

const LANDING_LADDER: [(NavRule, &str); 4] = [
    (NavRule::AdminWorkspace, ADMIN_HOME_PATH),
    (NavRule::StaffWorkspace, STAFF_HOME_PATH),
    (NavRule::OrgWorkspace, ORG_HOME_PATH),
    (NavRule::ApprovedProfile, CLIENT_HOME_PATH),
];

/// Default route for a caller after sign-in.
///
/// Total and deterministic: every input, including `None`, maps to a
/// non-empty path.
///
/// ```rust
/// use portal_access::{resolve_landing_path, PortalAccess};
///
/// let staff = PortalAccess::new("u").with_staff_workspace();
/// assert_eq!(resolve_landing_path(Some(&staff)), "/ops/today");
/// assert_eq!(resolve_landing_path(None), "/");
/// ```
pub fn resolve_landing_path(access: Option<&PortalAccess>) -> &'static str {
    let Some(access) = access else {
        return PUBLIC_HOME_PATH;
    };
    LANDING_LADDER
        .iter()
        .find(|(rule, _)| rule.evaluate(access))
        .map(|(_, path)| *path)
        .unwrap_or(PUBLIC_HOME_PATH)
}
