//! Transport configuration for session endpoints.

use anyhow::{Result, anyhow};
use axum::http::HeaderName;

const DEFAULT_IDENTITY_HEADER: &str = "x-authenticated-user";
const DEFAULT_ACCESS_COOKIE: &str = "access_token";
const DEFAULT_REFRESH_COOKIE: &str = "refresh_token";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    identity_header: HeaderName,
    access_cookie: String,
    refresh_cookie: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identity_header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
            access_cookie: DEFAULT_ACCESS_COOKIE.to_string(),
            refresh_cookie: DEFAULT_REFRESH_COOKIE.to_string(),
        }
    }
}

impl SessionConfig {
    /// # Errors
    /// Returns an error if `name` is not a valid header name.
    pub fn with_identity_header(mut self, name: &str) -> Result<Self> {
        self.identity_header = HeaderName::try_from(name.trim())
            .map_err(|err| anyhow!("invalid identity header {name:?}: {err}"))?;
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `name` is not a valid cookie name.
    pub fn with_access_cookie(mut self, name: &str) -> Result<Self> {
        self.access_cookie = cookie_name(name)?;
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `name` is not a valid cookie name.
    pub fn with_refresh_cookie(mut self, name: &str) -> Result<Self> {
        self.refresh_cookie = cookie_name(name)?;
        Ok(self)
    }

    #[must_use]
    pub const fn identity_header(&self) -> &HeaderName {
        &self.identity_header
    }

    #[must_use]
    pub fn access_cookie(&self) -> &str {
        &self.access_cookie
    }

    #[must_use]
    pub fn refresh_cookie(&self) -> &str {
        &self.refresh_cookie
    }
}

// RFC 6265 cookie-name is an RFC 7230 token.
fn cookie_name(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c));
    if valid {
        Ok(name.to_string())
    } else {
        Err(anyhow!("invalid cookie name {name:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.identity_header().as_str(), "x-authenticated-user");
        assert_eq!(config.access_cookie(), "access_token");
        assert_eq!(config.refresh_cookie(), "refresh_token");
    }

    #[test]
    fn overrides() -> Result<()> {
        let config = SessionConfig::default()
            .with_identity_header("X-Remote-User")?
            .with_access_cookie("at")?
            .with_refresh_cookie("rt")?;
        assert_eq!(config.identity_header().as_str(), "x-remote-user");
        assert_eq!(config.access_cookie(), "at");
        assert_eq!(config.refresh_cookie(), "rt");
        Ok(())
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(SessionConfig::default().with_identity_header("bad header").is_err());
        assert!(SessionConfig::default().with_access_cookie("").is_err());
        assert!(SessionConfig::default().with_refresh_cookie("a=b").is_err());
        assert!(SessionConfig::default().with_refresh_cookie("a;b").is_err());
    }
}
