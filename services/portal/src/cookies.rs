//! Minimal cookie header helpers.
//!
//! Only what the portal needs: reading one named value from the request
//! `Cookie` headers and rendering a `Set-Cookie` value.
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

/// First value of cookie `name` across every `Cookie` header.
///
/// A value in the RFC 6265 quoted form (`name="v"`) is returned unquoted.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| unquote(value.trim()))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Whether a value can be echoed back in a `Set-Cookie` header untouched.
pub fn is_cookie_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'"' | b'\\'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
}

/// Render a `Set-Cookie` header value scoped to `/`.
///
/// # Errors
/// - Returns `None` when `value` cannot be carried in a header.
pub fn set_cookie(name: &str, value: &str, attrs: CookieAttributes) -> Option<HeaderValue> {
    if !is_cookie_safe(value) {
        return None;
    }
    let mut rendered = format!("{name}={value}; Path=/");
    if attrs.http_only {
        rendered.push_str("; HttpOnly");
    }
    rendered.push_str("; SameSite=");
    rendered.push_str(attrs.same_site.as_str());
    if attrs.secure {
        rendered.push_str("; Secure");
    }
    HeaderValue::from_str(&rendered).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cookie_scans_all_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(COOKIE, HeaderValue::from_static("portal_session=abc"));
        assert_eq!(read_cookie(&headers, "lang"), Some("en"));
        assert_eq!(read_cookie(&headers, "portal_session"), Some("abc"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn read_cookie_requires_exact_name() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("xportal_csrf=1; portal_csrf=2"));
        assert_eq!(read_cookie(&headers, "portal_csrf"), Some("2"));
    }

    #[test]
    fn read_cookie_unquotes_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("portal_csrf=\"abc123\"; lone=\""),
        );
        assert_eq!(read_cookie(&headers, "portal_csrf"), Some("abc123"));
        assert_eq!(read_cookie(&headers, "lone"), Some("\""));
    }

    #[test]
    fn set_cookie_renders_attributes() {
        let value = set_cookie(
            "portal_csrf",
            "abc123",
            CookieAttributes {
                http_only: true,
                same_site: SameSite::Strict,
                secure: true,
            },
        )
        .expect("header");
        assert_eq!(
            value.to_str().expect("ascii"),
            "portal_csrf=abc123; Path=/; HttpOnly; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn set_cookie_rejects_unsafe_values() {
        let attrs = CookieAttributes {
            http_only: false,
            same_site: SameSite::Lax,
            secure: false,
        };
        assert!(set_cookie("c", "a;b", attrs).is_none());
        assert!(set_cookie("c", "", attrs).is_none());
        let plain = set_cookie("c", "v", attrs).expect("header");
        assert_eq!(plain.to_str().expect("ascii"), "c=v; Path=/; SameSite=Lax");
    }
}
