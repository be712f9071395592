//! # Tessera (session issuance and password rotation)
//!
//! `tessera` sits behind an authentication gateway. Callers arrive with an
//! identity already established upstream; tessera mints an access/refresh token
//! pair for them and mediates password changes.
//!
//! ## Session Issuance
//!
//! `POST /v1/auth/token` asks the credential issuer for an access token, then a
//! refresh token. Both are delivered as `HttpOnly`, `Secure`, `SameSite=Lax`
//! cookies, and only once both have been minted.
//!
//! ## Password Rotation
//!
//! `PUT /v1/auth/password` verifies the current password, checks the new one
//! against the complexity policy, then replaces the stored credential. A wrong
//! current password and an unknown account both surface as a plain
//! `400 Bad request` so the endpoint cannot be used as a verification oracle.

pub mod api;
pub mod cli;
pub mod credentials;
pub mod identity;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
