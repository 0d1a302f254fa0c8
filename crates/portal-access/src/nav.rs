//! Navigation tree model, per-request filtering, and active-item detection.
//!
//! # Purpose
//! Holds the static navigation configuration (sections, groups, items) and
//! reduces it to what one caller may see.
//!
//! # How it fits
//! The tree is built once at startup (built-in catalog or YAML) and validated.
//! Each request filters it against [`PortalAccess`] and marks the active item
//! for the current path.
//!
//! # Key invariants
//! - Filtering preserves source order and never yields an empty group or section.
//! - Rule names in configuration are parsed at load time; unknown names fail
//!   deserialization instead of hiding an item.
//! - Query constraints use the sentinel `"null"` to mean "key must be absent".
//!
//! # Common pitfalls
//! - `match` prefixes take priority over `exact`; an item with both ignores `exact`.
//! - Items with query constraints are never active when no query map is supplied.
use crate::paths::{clean_pathname, path_has_prefix, strip_query};
use crate::{AccessError, AccessResult, PortalAccess, RuleRef, evaluate_rule};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type QueryParams = HashMap<String, String>;

const ABSENT_SENTINEL: &str = "null";

/// Constraint on one query parameter of the current URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum QueryConstraint {
    Equals(String),
    Absent,
}

impl From<Option<String>> for QueryConstraint {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) if value != ABSENT_SENTINEL => QueryConstraint::Equals(value),
            _ => QueryConstraint::Absent,
        }
    }
}

impl From<QueryConstraint> for Option<String> {
    fn from(value: QueryConstraint) -> Self {
        match value {
            QueryConstraint::Equals(value) => Some(value),
            QueryConstraint::Absent => Some(ABSENT_SENTINEL.to_string()),
        }
    }
}

impl QueryConstraint {
    fn holds(&self, actual: Option<&String>) -> bool {
        match (self, actual) {
            (QueryConstraint::Equals(expected), Some(actual)) => expected == actual,
            (QueryConstraint::Equals(_), None) => false,
            (QueryConstraint::Absent, actual) => actual.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(
        default,
        deserialize_with = "deserialize_requires",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires: Option<RuleRef>,
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub match_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exact: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, QueryConstraint>,
}

impl NavItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            href: href.into(),
            requires: None,
            match_prefixes: Vec::new(),
            exact: false,
            query: BTreeMap::new(),
        }
    }

    pub fn requires(mut self, rule: impl Into<RuleRef>) -> Self {
        self.requires = Some(rule.into());
        self
    }

    pub fn matching(mut self, prefix: impl Into<String>) -> Self {
        self.match_prefixes.push(prefix.into());
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, constraint: QueryConstraint) -> Self {
        self.query.insert(key.into(), constraint);
        self
    }

    /// Whether `access` may see this item.
    pub fn is_visible(&self, access: Option<&PortalAccess>) -> bool {
        match &self.requires {
            None => true,
            Some(rule) => evaluate_rule(access, rule),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    pub id: String,
    pub label: String,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub id: String,
    pub label: String,
    pub groups: Vec<NavGroup>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleNames {
    One(String),
    Many(Vec<String>),
}

fn deserialize_requires<'de, D>(deserializer: D) -> Result<Option<RuleRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(names) = Option::<RuleNames>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = match names {
        RuleNames::One(name) => RuleRef::parse_names(&[name]),
        RuleNames::Many(names) => RuleRef::parse_names(&names),
    };
    parsed.map(Some).map_err(serde::de::Error::custom)
}

/// Reduce a navigation tree to what `access` may see.
///
/// # Invariants
/// - Surviving items, groups, and sections keep their source order.
/// - Groups left without items and sections left without groups are dropped.
pub fn filter_nav_tree(sections: &[NavSection], access: Option<&PortalAccess>) -> Vec<NavSection> {
    sections
        .iter()
        .filter_map(|section| {
            let groups: Vec<NavGroup> = section
                .groups
                .iter()
                .filter_map(|group| {
                    let items: Vec<NavItem> = group
                        .items
                        .iter()
                        .filter(|item| item.is_visible(access))
                        .cloned()
                        .collect();
                    (!items.is_empty()).then(|| NavGroup {
                        id: group.id.clone(),
                        label: group.label.clone(),
                        items,
                    })
                })
                .collect();
            (!groups.is_empty()).then(|| NavSection {
                id: section.id.clone(),
                label: section.label.clone(),
                groups,
            })
        })
        .collect()
}

/// Decide whether `item` is the active entry for the current location.
///
/// Path matching, in priority order:
/// 1. any `match` prefix (equal, or followed by `/`);
/// 2. `exact`: strict equality with the item's href path;
/// 3. prefix match against the item's href path.
///
/// Declared query constraints must all hold as well.
pub fn is_item_active(item: &NavItem, pathname: &str, search_params: Option<&QueryParams>) -> bool {
    let current = clean_pathname(pathname);
    let own_path = clean_pathname(strip_query(&item.href));

    let path_matches = if !item.match_prefixes.is_empty() {
        item.match_prefixes
            .iter()
            .any(|prefix| path_has_prefix(&current, &clean_pathname(prefix)))
    } else if item.exact {
        current == own_path
    } else {
        path_has_prefix(&current, &own_path)
    };
    if !path_matches {
        return false;
    }

    if item.query.is_empty() {
        return true;
    }
    let Some(params) = search_params else {
        return false;
    };
    item.query
        .iter()
        .all(|(key, constraint)| constraint.holds(params.get(key)))
}

/// First active item in tree order, if any.
pub fn find_active_item<'a>(
    sections: &'a [NavSection],
    pathname: &str,
    search_params: Option<&QueryParams>,
) -> Option<&'a NavItem> {
    sections
        .iter()
        .flat_map(|section| section.groups.iter())
        .flat_map(|group| group.items.iter())
        .find(|item| is_item_active(item, pathname, search_params))
}

/// Check structural rules for a configured navigation tree.
///
/// # Errors
/// - [`AccessError::InvalidNavigation`] for empty sections or groups, or for
///   hrefs and match prefixes that are not absolute paths.
pub fn validate_navigation(sections: &[NavSection]) -> AccessResult<()> {
    for section in sections {
        if section.groups.is_empty() {
            return Err(AccessError::InvalidNavigation(format!(
                "section {} has no groups",
                section.id
            )));
        }
        for group in &section.groups {
            if group.items.is_empty() {
                return Err(AccessError::InvalidNavigation(format!(
                    "group {}/{} has no items",
                    section.id, group.id
                )));
            }
            for item in &group.items {
                let paths = std::iter::once(&item.href).chain(item.match_prefixes.iter());
                for path in paths {
                    if !path.starts_with('/') {
                        return Err(AccessError::InvalidNavigation(format!(
                            "item {} path {path} must start with /",
                            item.id
                        )));
                    }
                }
                if let Some(RuleRef::All(rules)) = &item.requires {
                    if rules.is_empty() {
                        return Err(AccessError::InvalidNavigation(format!(
                            "item {} has an empty rule list",
                            item.id
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}
