use argon2::{
    Argon2, ParamsBuilder,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::Utc;
use rand::{RngCore, rngs::OsRng};
use redis::AsyncCommands;
use tower_cookies::{Cookie, Cookies, cookie::time::Duration};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::error::{AppError, DenyReason, Result};
use crate::models::session::Session;
use crate::models::user::User;
use crate::repositories::user as user_repo;
use crate::state::AppState;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// The cookie holding the session ID.
pub const SESSION_COOKIE: &str = "session_id";

/// Hashes a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    Ok(result)
}

/// Creates a secure cookie with the given name, value, and max age.
fn create_secure_cookie(name: String, value: String, max_age_days: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);

    let is_production = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "development".to_string()) == "production";

    cookie.set_http_only(true);

    if is_production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    let duration_secs = max_age_days * 86400;
    cookie.set_max_age(Duration::seconds(duration_secs));
    cookie.set_path("/");

    cookie
}

/// Signs up a new user.
pub async fn signup(
    state: &AppState,
    username: String,
    email: String,
    password: String,
    image_url: Option<String>,
) -> Result<User> {
    tracing::debug!("🔐 Creating user: {}", username);
    let hashed_password = hash_password(&password)?;

    let user = user_repo::create_user(
        &state.db,
        &username,
        &email,
        &hashed_password,
        image_url.as_deref(),
    )
    .await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Authenticates a user by username and password.
pub async fn authenticate_user(
    state: &AppState,
    username: String,
    password: String,
) -> Result<User> {
    tracing::debug!("🔐 Authenticating user: {}", username);

    let user = user_repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

    if !verify_password(&password, &user.password)? {
        return Err(AppError::Authentication(
            "Invalid username or password".to_string(),
        ));
    }

    tracing::info!("✅ User authenticated: {}", user.id);

    Ok(user)
}

/// Opens a session for the given user: writes the session record to Redis
/// under `session:{id}` and sets the session cookie.
pub async fn open_session(state: &AppState, cookies: &Cookies, user: &User) -> Result<()> {
    let session_id = Uuid::new_v4();
    tracing::debug!("🔑 Generated session_id: {}", session_id);

    let session = Session {
        user_id: user.id,
        created_at: Utc::now(),
        expires_at: Utc::now() + chrono::Duration::days(state.config.session_duration_days),
    };

    let session_json = sonic_rs::to_string(&session)
        .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

    let expiration_seconds: u64 = (state.config.session_duration_days * 86400) as u64;
    let mut redis = state.redis.clone();
    let _: () = redis
        .set_ex(
            format!("session:{}", session_id),
            &session_json,
            expiration_seconds,
        )
        .await
        .map_err(|e| {
            tracing::error!("❌ Redis set_ex failed: {}", e);
            AppError::Redis(e)
        })?;

    tracing::info!("✅ Session saved to Redis: session:{}", session_id);

    let session_cookie = create_secure_cookie(
        SESSION_COOKIE.to_string(),
        session_id.to_string(),
        state.config.session_duration_days,
    );
    cookies.add(session_cookie);
    tracing::info!("✅ Session cookie added for user: {}", user.id);

    Ok(())
}

/// Closes the current session: deletes the Redis record and clears the
/// cookie. A missing cookie is not an error.
pub async fn close_session(state: &AppState, cookies: &Cookies) -> Result<()> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        let session_id = cookie.value().to_string();

        let mut redis = state.redis.clone();
        let _: () = redis
            .del(format!("session:{}", session_id))
            .await
            .unwrap_or(());

        tracing::info!("✅ Session deleted from Redis");
    }

    let mut session_cookie = Cookie::new(SESSION_COOKIE, "");
    session_cookie.set_max_age(Duration::seconds(0));
    session_cookie.set_path("/");
    cookies.remove(session_cookie);

    Ok(())
}

/// Extracts the session token from the request cookies.
fn extract_session_token(cookies: &Cookies) -> Option<Uuid> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// The session guard: resolves the request's session context to a `User`.
///
/// A missing cookie, a missing or expired Redis record, malformed session
/// JSON, and a user id with no backing row all fail the same way; callers
/// cannot tell "never logged in" from "stale session". Infrastructure
/// failures are logged but also resolve to `Unauthenticated`: a request
/// that cannot be authenticated is not authenticated.
pub async fn resolve_current_user(
    state: &AppState,
    cookies: &Cookies,
) -> std::result::Result<User, DenyReason> {
    let Some(session_id) = extract_session_token(cookies) else {
        tracing::debug!("❌ No session cookie found");
        return Err(DenyReason::Unauthenticated);
    };

    let mut redis = state.redis.clone();
    let session_json: Option<String> = redis
        .get(format!("session:{}", session_id))
        .await
        .map_err(|e| {
            tracing::warn!("❌ Redis error while loading session: {}", e);
            DenyReason::Unauthenticated
        })?;

    let Some(session_json) = session_json else {
        tracing::debug!("❌ No session record for {}", session_id);
        return Err(DenyReason::Unauthenticated);
    };

    let session: Session = sonic_rs::from_str(&session_json).map_err(|e| {
        tracing::warn!("❌ Invalid session JSON: {}", e);
        DenyReason::Unauthenticated
    })?;

    if session.is_expired(Utc::now()) {
        tracing::warn!("❌ Session expired for user: {}", session.user_id);

        let _: () = redis
            .del(format!("session:{}", session_id))
            .await
            .unwrap_or(());

        return Err(DenyReason::Unauthenticated);
    }

    // An id with no backing user is treated exactly like no session at all.
    let user = user_repo::find_by_id(&state.db, session.user_id)
        .await
        .map_err(|e| {
            tracing::error!("❌ User lookup failed: {}", e);
            DenyReason::Unauthenticated
        })?
        .ok_or_else(|| {
            tracing::warn!("❌ Session bound to nonexistent user: {}", session.user_id);
            DenyReason::Unauthenticated
        })?;

    tracing::debug!("✅ User authenticated: {}", user.id);

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("SecurePass123!@#").unwrap();
        assert!(verify_password("SecurePass123!@#", &hash).unwrap());
        assert!(!verify_password("WrongPass123!@#", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("SecurePass123!@#").unwrap();
        let b = hash_password("SecurePass123!@#").unwrap();
        assert_ne!(a, b);
    }
}
