//! Bearer-token cookies.

use axum::http::{HeaderValue, header::InvalidHeaderValue};

use super::state::SessionConfig;
use crate::{credentials::Token, session::SessionGrant};

// IMF-fixdate, as required for the Expires attribute.
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Build a secure `HttpOnly` cookie that expires with the token.
pub(super) fn token_cookie(name: &str, token: &Token) -> Result<HeaderValue, InvalidHeaderValue> {
    let expires = token.expiry().format(COOKIE_DATE_FORMAT);
    HeaderValue::from_str(&format!(
        "{name}={}; Path=/; Expires={expires}; HttpOnly; Secure; SameSite=Lax",
        token.value()
    ))
}

/// Both session cookies, or neither.
pub(super) fn session_cookies(
    config: &SessionConfig,
    grant: &SessionGrant,
) -> Result<[HeaderValue; 2], InvalidHeaderValue> {
    Ok([
        token_cookie(config.access_cookie(), &grant.access)?,
        token_cookie(config.refresh_cookie(), &grant.refresh)?,
    ])
}
