//! Path normalization and redirect targets.
//!
//! # Purpose
//! Keeps every comparison between request paths and configured hrefs on one
//! normalized form, and builds login redirects that carry a safe return path.
//!
//! # Key invariants
//! - `clean_pathname` never returns an empty string and never ends in `/`
//!   unless the result is exactly `/`.
//! - Return paths embedded in login redirects are same-origin relative paths.
use url::form_urlencoded;

pub const PUBLIC_HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const LOGIN_NEXT_PARAM: &str = "next";

/// Normalize a request path for matching.
///
/// Drops any query string or fragment, removes trailing slashes, and makes
/// sure the result starts with `/`.
///
/// ```rust
/// use portal_access::clean_pathname;
///
/// assert_eq!(clean_pathname("/ops/today/"), "/ops/today");
/// assert_eq!(clean_pathname("/"), "/");
/// ```
pub fn clean_pathname(path: &str) -> String {
    let path = strip_query(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return PUBLIC_HOME_PATH.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Path portion of an href, without query string or fragment.
pub fn strip_query(href: &str) -> &str {
    let end = href.find(|c: char| c == '?' || c == '#').unwrap_or(href.len());
    &href[..end]
}

/// True when `path` equals `prefix` or sits below it.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if path == prefix {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Reduce an arbitrary return target to a same-origin relative path.
///
/// Anything that could leave the site (absolute URLs, protocol-relative
/// `//host` paths, backslash tricks) collapses to [`PUBLIC_HOME_PATH`].
pub fn sanitize_next_path(next: &str) -> &str {
    let next = next.trim();
    if !next.starts_with('/') || next.starts_with("//") || next.contains('\\') {
        return PUBLIC_HOME_PATH;
    }
    next
}

/// Login path carrying the originally requested path as `next`.
pub fn login_redirect(next: &str) -> String {
    let next = sanitize_next_path(next);
    let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?{LOGIN_NEXT_PARAM}={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_pathname_strips_trailing_slash() {
        assert_eq!(clean_pathname("/ops/today/"), "/ops/today");
        assert_eq!(clean_pathname("/ops/today//"), "/ops/today");
        assert_eq!(clean_pathname("/ops/today"), "/ops/today");
    }

    #[test]
    fn clean_pathname_root_and_empty() {
        assert_eq!(clean_pathname("/"), "/");
        assert_eq!(clean_pathname(""), "/");
        assert_eq!(clean_pathname("///"), "/");
    }

    #[test]
    fn clean_pathname_drops_query_and_adds_slash() {
        assert_eq!(clean_pathname("/profile?tab=consents"), "/profile");
        assert_eq!(clean_pathname("/profile/#top"), "/profile");
        assert_eq!(clean_pathname("home"), "/home");
    }

    #[test]
    fn prefix_requires_segment_boundary() {
        assert!(path_has_prefix("/ops/today", "/ops/today"));
        assert!(path_has_prefix("/ops/today/donations", "/ops/today"));
        assert!(!path_has_prefix("/ops/todayish", "/ops/today"));
        assert!(!path_has_prefix("/ops", "/ops/today"));
    }

    #[test]
    fn sanitize_next_rejects_offsite_targets() {
        assert_eq!(sanitize_next_path("/ops/today"), "/ops/today");
        assert_eq!(sanitize_next_path("https://evil.example"), "/");
        assert_eq!(sanitize_next_path("//evil.example"), "/");
        assert_eq!(sanitize_next_path("/\\evil.example"), "/");
        assert_eq!(sanitize_next_path(""), "/");
    }

    #[test]
    fn login_redirect_encodes_next() {
        assert_eq!(login_redirect("/ops/today"), "/login?next=%2Fops%2Ftoday");
        assert_eq!(
            login_redirect("/a?tab=x y"),
            "/login?next=%2Fa%3Ftab%3Dx+y"
        );
        assert_eq!(login_redirect("http://evil"), "/login?next=%2F");
    }
}
