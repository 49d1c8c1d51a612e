use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    flash,
    models::user::CurrentUser,
    services::auth as auth_service,
    state::AppState,
};

/// A middleware that requires a resolved current user.
///
/// On success the `CurrentUser` is attached to the request extensions and the
/// handler never re-reads the session. On failure the request short-circuits
/// into the flash-and-redirect denial before any handler logic runs, so an
/// unauthenticated request against a nonexistent resource is reported as
/// unauthenticated, not as not-found.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    match auth_service::resolve_current_user(&state, &cookies).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(reason) => flash::deny(&cookies, reason),
    }
}
