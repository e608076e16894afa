// ABOUTME: Auth gate middleware wrapping every protected photo route
// ABOUTME: Verifies the credential cookie and stores the caller identity in request extensions

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::Result;
use crate::session;

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let user =
        session::extract_user_from_jar(&jar, &state.auth_cookie_name, state.verifier.as_ref())?;

    tracing::debug!(user_id = %user.user_id, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
