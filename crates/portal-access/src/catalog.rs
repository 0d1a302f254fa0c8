//! Built-in navigation tree for the portal workspaces.
//!
//! Deployments may replace it through configuration; the service validates
//! whichever tree it loads.
use crate::landing::{ADMIN_HOME_PATH, CLIENT_HOME_PATH, ORG_HOME_PATH, STAFF_HOME_PATH};
use crate::{NavGroup, NavItem, NavRule, NavSection, QueryConstraint, RuleRef};

fn group(id: &str, label: &str, items: Vec<NavItem>) -> NavGroup {
    NavGroup {
        id: id.to_string(),
        label: label.to_string(),
        items,
    }
}

fn section(id: &str, label: &str, groups: Vec<NavGroup>) -> NavSection {
    NavSection {
        id: id.to_string(),
        label: label.to_string(),
        groups,
    }
}

pub fn default_navigation() -> Vec<NavSection> {
    vec![
        section(
            "ops",
            "Operations",
            vec![
                group(
                    "frontline",
                    "Frontline",
                    vec![
                        NavItem::new("ops-today", "Today", STAFF_HOME_PATH)
                            .requires(NavRule::StaffWorkspace)
                            .matching(STAFF_HOME_PATH),
                        NavItem::new("ops-clients", "Clients", "/ops/clients")
                            .requires(NavRule::OpsFrontline),
                        NavItem::new("ops-cfs", "Calls for service", "/ops/cfs")
                            .requires(NavRule::CallsForService),
                        NavItem::new("ops-time", "Time tracking", "/ops/time")
                            .requires(RuleRef::all([
                                NavRule::StaffWorkspace,
                                NavRule::TimeTracking,
                            ])),
                    ],
                ),
                group(
                    "supplies",
                    "Supplies",
                    vec![
                        NavItem::new("ops-inventory", "Inventory", "/ops/inventory")
                            .requires(NavRule::InventoryOps),
                        NavItem::new("ops-costs", "Costs", "/ops/costs")
                            .requires(NavRule::ReportCosts),
                    ],
                ),
            ],
        ),
        section(
            "organization",
            "Organization",
            vec![group(
                "org",
                "Organization",
                vec![
                    NavItem::new("org-home", "Overview", ORG_HOME_PATH)
                        .requires(NavRule::OrgWorkspace)
                        .exact(),
                    NavItem::new("org-members", "Members", "/ops/org/members")
                        .requires(RuleRef::all([
                            NavRule::OrgWorkspace,
                            NavRule::ManageOrgUsers,
                        ])),
                ],
            )],
        ),
        section(
            "admin",
            "Administration",
            vec![group(
                "admin",
                "Administration",
                vec![
                    NavItem::new("admin-home", "Overview", ADMIN_HOME_PATH)
                        .requires(NavRule::AdminWorkspace)
                        .exact(),
                    NavItem::new("admin-users", "Users", "/ops/admin/users")
                        .requires(RuleRef::all([
                            NavRule::AdminWorkspace,
                            NavRule::ManageUsers,
                        ])),
                    NavItem::new("admin-consents", "Consents", "/ops/admin/consents")
                        .requires(NavRule::ManageConsents),
                    NavItem::new("admin-website", "Website", "/ops/admin/website")
                        .requires(RuleRef::all([
                            NavRule::AdminWorkspace,
                            NavRule::ManageWebsite,
                        ])),
                    NavItem::new("admin-platform", "Platform", "/ops/admin/platform")
                        .requires(NavRule::IharcAdmin),
                ],
            )],
        ),
        section(
            "client",
            "My portal",
            vec![group(
                "client",
                "My portal",
                vec![
                    NavItem::new("client-home", "Home", CLIENT_HOME_PATH)
                        .requires(NavRule::ApprovedProfile)
                        .exact(),
                    NavItem::new("client-profile", "Profile", "/profile")
                        .exact()
                        .with_query("tab", QueryConstraint::Absent),
                    NavItem::new("client-consents", "Consents", "/profile?tab=consents")
                        .exact()
                        .with_query("tab", QueryConstraint::Equals("consents".to_string())),
                    NavItem::new("client-support", "Get help", "/support"),
                ],
            )],
        ),
    ]
}
