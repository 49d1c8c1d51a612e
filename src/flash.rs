use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tower_cookies::{Cookie, Cookies};

use crate::error::DenyReason;

/// The cookie carrying a one-shot notice to the next rendered page.
const FLASH_COOKIE: &str = "flash";

/// The user-visible text for every denied request, regardless of reason.
pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

fn encode(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

fn decode(value: &str) -> Option<String> {
    URL_SAFE_NO_PAD
        .decode(value.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Stores a notice for the next rendered page.
///
/// The value is base64-encoded so the text can carry spaces and punctuation
/// without running into cookie-value restrictions.
pub fn set(cookies: &Cookies, message: &str) {
    let mut cookie = Cookie::new(FLASH_COOKIE, encode(message));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

/// Reads and clears the pending notice, if any.
pub fn take(cookies: &Cookies) -> Option<String> {
    let value = cookies.get(FLASH_COOKIE).map(|c| c.value().to_string())?;

    let mut removal = Cookie::new(FLASH_COOKIE, "");
    removal.set_path("/");
    cookies.remove(removal);

    decode(&value)
}

/// Builds a `302 Found` redirect to the given location.
pub fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// The terminal `Denied` response: flashes "Access unauthorized." and
/// redirects to the home page. The reason only affects what gets logged.
pub fn deny(cookies: &Cookies, reason: DenyReason) -> Response {
    match reason {
        DenyReason::Unauthenticated => {
            tracing::warn!("❌ Denied: no authenticated user");
        }
        DenyReason::Unauthorized => {
            tracing::warn!("❌ Denied: ownership check failed");
        }
    }

    set(cookies, ACCESS_UNAUTHORIZED);
    redirect_found("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let encoded = encode(ACCESS_UNAUTHORIZED);
        assert!(!encoded.contains(' '));
        assert_eq!(decode(&encoded).as_deref(), Some(ACCESS_UNAUTHORIZED));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode("not base64!!!"), None);
    }

    #[test]
    fn redirect_found_is_302_with_location() {
        let resp = redirect_found("/users/9000");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/users/9000")
        );
    }

    #[test]
    fn both_deny_reasons_present_the_same_text() {
        // The notice never leaks whether the session or the ownership check
        // failed.
        assert!(ACCESS_UNAUTHORIZED.contains("Access unauthorized"));
    }
}
