use askama::Template;
use axum::{
    Extension, Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    flash,
    models::user::CurrentUser,
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

/// The request payload for signup.
#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

/// The request payload for login.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// The signup form page.
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub flash: Option<String>,
}

/// The login form page.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flash: Option<String>,
}

fn signup_page(flash: Option<String>) -> Result<Response> {
    Ok(Html(SignupTemplate { flash }.render()?).into_response())
}

fn login_page(flash: Option<String>) -> Result<Response> {
    Ok(Html(LoginTemplate { flash }.render()?).into_response())
}

/// Renders the signup form.
#[axum::debug_handler]
pub async fn signup_form(cookies: Cookies) -> Result<Response> {
    signup_page(flash::take(&cookies))
}

/// Handles signup: creates the user and opens their first session.
///
/// Validation failures (including a taken username or email) re-render the
/// form with the notice instead of surfacing an error response.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    tracing::info!("📝 Signup attempt for: {}", form.username);

    if let Err(AppError::Validation(msg)) = validate_username(&form.username)
        .and_then(|_| validate_email(&form.email))
        .and_then(|_| validate_password(&form.password))
    {
        return signup_page(Some(msg));
    }

    let image_url = form.image_url.filter(|url| !url.trim().is_empty());

    let user = match auth_service::signup(
        &state,
        form.username,
        form.email,
        form.password,
        image_url,
    )
    .await
    {
        Ok(user) => user,
        Err(AppError::Validation(msg)) => return signup_page(Some(msg)),
        Err(e) => return Err(e),
    };

    auth_service::open_session(&state, &cookies, &user).await?;

    tracing::info!("✅ User registered: {}", user.id);

    Ok(flash::redirect_found("/"))
}

/// Renders the login form.
#[axum::debug_handler]
pub async fn login_form(cookies: Cookies) -> Result<Response> {
    login_page(flash::take(&cookies))
}

/// Handles login: verifies credentials and opens a session.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", form.username);

    if let Err(AppError::Validation(msg)) = validate_username(&form.username) {
        return login_page(Some(msg));
    }

    let user = match auth_service::authenticate_user(&state, form.username, form.password).await {
        Ok(user) => user,
        Err(AppError::Authentication(msg)) => return login_page(Some(msg)),
        Err(e) => return Err(e),
    };

    auth_service::open_session(&state, &cookies, &user).await?;

    flash::set(&cookies, &format!("Hello, {}!", user.username));

    Ok(flash::redirect_found("/"))
}

/// Handles logout: closes the session and returns to the login page.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cookies: Cookies,
) -> Result<Response> {
    tracing::info!("👋 Logout for user: {}", user.id);

    auth_service::close_session(&state, &cookies).await?;

    flash::set(&cookies, "You have successfully logged out.");

    Ok(flash::redirect_found("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_render_with_notice() {
        let body = SignupTemplate {
            flash: Some("Username or email already taken".to_string()),
        }
        .render()
        .unwrap();
        assert!(body.contains("Username or email already taken"));
        assert!(body.contains(r#"action="/signup""#));

        let body = LoginTemplate { flash: None }.render().unwrap();
        assert!(body.contains(r#"action="/login""#));
    }
}
