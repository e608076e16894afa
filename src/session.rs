// ABOUTME: Credential extraction from the request cookie jar
// ABOUTME: Resolves the caller identity that protected photo operations act on behalf of

use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::TokenVerifier;
use crate::error::{AppError, Result};

pub const NO_TOKEN: &str = "Unauthorized - No token";

/// Identity attached to a request once the auth gate has accepted its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

pub fn extract_user_from_jar(
    jar: &CookieJar,
    cookie_name: &str,
    verifier: &dyn TokenVerifier,
) -> Result<AuthenticatedUser> {
    let token = jar
        .get(cookie_name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?;

    let user_id = verifier.verify(token)?;

    Ok(AuthenticatedUser { user_id })
}
