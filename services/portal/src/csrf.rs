//! Anti-forgery token guard.
//!
//! # Purpose
//! Makes sure every rendered page carries a CSRF token and that the browser
//! persists the very same value, then checks that value on form submissions.
//!
//! # How it fits
//! [`csrf_guard`] is the innermost router-wide layer, so it finishes before any
//! handler runs an access check. Handlers read the token from the
//! [`RequestCsrf`] request extension, never from the raw `Cookie` header,
//! which is what keeps a freshly issued token and the rendered token equal.
//!
//! # Key invariants
//! - Tokens are 32 bytes from the OS entropy source, lowercase hex encoded.
//! - An existing cookie value is forwarded unchanged.
//! - Entropy failure fails the request; no page renders without a token.
//! - Validation is exact and constant-time; absence or mismatch rejects.
//!
//! # Wire contract
//! `Set-Cookie: portal_csrf=<64 hex>; Path=/; HttpOnly; SameSite=Strict[; Secure]`.
//! Browsers keep this cookie across deployments, so the name, length, and
//! attributes must stay stable.
use crate::api::error::api_internal_message;
use crate::cookies::{CookieAttributes, SameSite, is_cookie_safe, read_cookie, set_cookie};
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const CSRF_COOKIE_NAME: &str = "portal_csrf";
pub const CSRF_FORM_FIELD: &str = "csrf_token";
pub const CSRF_TOKEN_BYTES: usize = 32;
pub const CSRF_FAILURE_MESSAGE: &str = "Your session expired. Refresh the page and try again.";

const UNGUARDED_PREFIXES: [&str; 3] = ["/static/", "/_next/static/", "/_next/image"];
const UNGUARDED_PATHS: [&str; 1] = ["/favicon.ico"];

#[derive(Debug, Error)]
pub enum CsrfError {
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(#[from] rand::Error),
    #[error("csrf token cannot be carried in a cookie")]
    InvalidCookie,
    #[error("csrf token missing")]
    Missing,
    #[error("csrf token mismatch")]
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generate a fresh token from the OS entropy source.
    ///
    /// # Errors
    /// - [`CsrfError::EntropyUnavailable`] when the OS cannot supply randomness.
    pub fn generate() -> Result<Self, CsrfError> {
        Self::generate_with(&mut OsRng)
    }

    pub fn generate_with<R: RngCore>(rng: &mut R) -> Result<Self, CsrfError> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        rng.try_fill_bytes(&mut bytes)?;
        Ok(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token view attached to the request for downstream handlers.
///
/// `issued` is true when the request arrived without a usable cookie and the
/// guard minted `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCsrf {
    pub token: CsrfToken,
    pub issued: bool,
}

impl RequestCsrf {
    /// Cookie value the browser actually sent, if any.
    pub fn cookie_value(&self) -> Option<&str> {
        (!self.issued).then(|| self.token.as_str())
    }
}

/// Reuse the request's token cookie or mint a new token.
pub fn ensure_token(headers: &axum::http::HeaderMap) -> Result<RequestCsrf, CsrfError> {
    ensure_token_with(headers, &mut OsRng)
}

/// [`ensure_token`] drawing new tokens from `rng`.
pub fn ensure_token_with<R: RngCore>(
    headers: &axum::http::HeaderMap,
    rng: &mut R,
) -> Result<RequestCsrf, CsrfError> {
    match read_cookie(headers, CSRF_COOKIE_NAME) {
        Some(existing) if is_cookie_safe(existing) => Ok(RequestCsrf {
            token: CsrfToken(existing.to_string()),
            issued: false,
        }),
        _ => Ok(RequestCsrf {
            token: CsrfToken::generate_with(rng)?,
            issued: true,
        }),
    }
}

/// `Set-Cookie` value mirroring `token` to the browser.
pub fn token_cookie(token: &CsrfToken, secure: bool) -> Result<HeaderValue, CsrfError> {
    set_cookie(
        CSRF_COOKIE_NAME,
        token.as_str(),
        CookieAttributes {
            http_only: true,
            same_site: SameSite::Strict,
            secure,
        },
    )
    .ok_or(CsrfError::InvalidCookie)
}

/// Compare a submitted form value against the cookie value.
///
/// # Errors
/// - [`CsrfError::Missing`] when either side is absent or empty.
/// - [`CsrfError::Mismatch`] when the values differ.
pub fn validate_csrf(cookie: Option<&str>, submitted: Option<&str>) -> Result<(), CsrfError> {
    let (Some(cookie), Some(submitted)) = (cookie, submitted) else {
        return Err(CsrfError::Missing);
    };
    if cookie.is_empty() || submitted.is_empty() {
        return Err(CsrfError::Missing);
    }
    if bool::from(cookie.as_bytes().ct_eq(submitted.as_bytes())) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

/// Validate a form submission against the request's token view.
pub fn validate_submission(csrf: &RequestCsrf, submitted: Option<&str>) -> Result<(), CsrfError> {
    let result = validate_csrf(csrf.cookie_value(), submitted);
    if let Err(err) = &result {
        metrics::counter!("portal_csrf_rejections_total").increment(1);
        tracing::warn!(error = %err, "csrf validation failed");
    }
    result
}

pub fn is_guarded_path(path: &str) -> bool {
    !(UNGUARDED_PATHS.contains(&path)
        || UNGUARDED_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix)))
}

fn is_https(request: &Request) -> bool {
    if request.uri().scheme_str() == Some("https") {
        return true;
    }
    request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Router middleware issuing and mirroring the CSRF token.
pub async fn csrf_guard(request: Request, next: Next) -> Response {
    guard_with_rng(request, next, OsRng).await
}

/// [`csrf_guard`] with an explicit entropy source.
///
/// Fails closed: when no token can be prepared the handler never runs and
/// no cookie is set.
pub(crate) async fn guard_with_rng<R: RngCore + Send>(
    mut request: Request,
    next: Next,
    rng: R,
) -> Response {
    if !is_guarded_path(request.uri().path()) {
        return next.run(request).await;
    }

    let secure = is_https(&request);
    let (csrf, cookie) = match prepare(request.headers(), secure, rng) {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::error!(error = %err, "failed to prepare csrf token");
            return api_internal_message("unable to secure request").into_response();
        }
    };
    if csrf.issued {
        metrics::counter!("portal_csrf_tokens_issued_total").increment(1);
        tracing::debug!("issued csrf token");
    }

    request.extensions_mut().insert(csrf);
    let mut response = next.run(request).await;
    response.headers_mut().append(SET_COOKIE, cookie);
    response
}

fn prepare<R: RngCore>(
    headers: &axum::http::HeaderMap,
    secure: bool,
    mut rng: R,
) -> Result<(RequestCsrf, HeaderValue), CsrfError> {
    let csrf = ensure_token_with(headers, &mut rng)?;
    let cookie = token_cookie(&csrf.token, secure)?;
    Ok((csrf, cookie))
}
