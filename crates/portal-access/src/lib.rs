//! Access rules and navigation resolution for the case-management portal.
//!
//! # Purpose
//! Turns a request's resolved [`PortalAccess`] into permission checks, the
//! visible navigation tree, area render/redirect decisions, and the landing
//! path after sign-in.
//!
//! # How it fits
//! The portal service loads access facts through an external collaborator,
//! runs its CSRF guard, then calls into this crate. Nothing here performs I/O
//! or holds state between requests.
//!
//! # Key invariants
//! - Rule names are a closed enum; configuration text is parsed up front.
//! - Filtering never yields empty groups and never reorders items.
//! - Area redirects never point back at the current path.
//! - Landing resolution is total and deterministic.
//!
//! # Examples
//! ```rust
//! use portal_access::{default_navigation, filter_nav_tree, resolve_landing_path, PortalAccess};
//!
//! let access = PortalAccess::new("user-1").with_staff_workspace();
//! assert_eq!(resolve_landing_path(Some(&access)), "/ops/today");
//! let nav = filter_nav_tree(&default_navigation(), Some(&access));
//! assert!(nav.iter().all(|section| !section.groups.is_empty()));
//! ```
//!
//! # Common pitfalls
//! - Passing a default `PortalAccess` instead of `None` for anonymous callers
//!   skips the login redirect.

mod access;
mod area;
mod catalog;
mod errors;
mod landing;
mod nav;
mod paths;
mod rules;

pub use access::{
    AffiliationType, ApprovalStatus, FEATURE_CALLS_FOR_SERVICE, FEATURE_TIME_TRACKING,
    PortalAccess, PortalProfile, ROLE_IHARC_ADMIN,
};
pub use area::{AccessDecision, AreaContext, DenialReason, PortalArea, require_area};
pub use catalog::default_navigation;
pub use errors::{AccessError, AccessResult};
pub use landing::{
    ADMIN_HOME_PATH, CLIENT_HOME_PATH, ORG_HOME_PATH, STAFF_HOME_PATH, resolve_landing_path,
};
pub use nav::{
    NavGroup, NavItem, NavSection, QueryConstraint, QueryParams, filter_nav_tree,
    find_active_item, is_item_active, validate_navigation,
};
pub use paths::{
    LOGIN_NEXT_PARAM, LOGIN_PATH, PUBLIC_HOME_PATH, clean_pathname, login_redirect,
    path_has_prefix, sanitize_next_path, strip_query,
};
pub use rules::{NavRule, RuleRef, evaluate_rule};
