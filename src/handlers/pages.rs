use askama::Template;
use axum::{
    Extension,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    flash,
    models::{message::MessageWithAuthor, user::CurrentUser},
    repositories::user as user_repo,
    services::{auth as auth_service, messages as message_service},
    state::AppState,
};

/// A message row as rendered in listings.
pub struct MessageItem {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

impl From<MessageWithAuthor> for MessageItem {
    fn from(m: MessageWithAuthor) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username: m.username,
            text: m.text,
            created_at: m.created_at.format("%d %B %Y").to_string(),
        }
    }
}

/// The home page for an authenticated user: the most recent messages.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub flash: Option<String>,
    pub username: String,
    pub user_id: i64,
    pub messages: Vec<MessageItem>,
}

/// The landing page for anonymous visitors.
#[derive(Template)]
#[template(path = "home_anon.html")]
pub struct HomeAnonTemplate {
    pub flash: Option<String>,
}

/// A user's profile: their messages, newest first.
#[derive(Template)]
#[template(path = "user_profile.html")]
pub struct ProfileTemplate {
    pub flash: Option<String>,
    pub username: String,
    pub user_id: i64,
    pub image_url: Option<String>,
    pub can_delete: bool,
    pub messages: Vec<MessageItem>,
}

/// The 404 page.
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub flash: Option<String>,
}

/// The home page. Public: anonymous visitors get the landing page, and this
/// is also where denied requests land so the pending notice is shown here.
#[axum::debug_handler]
pub async fn home(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let flash = flash::take(&cookies);

    match auth_service::resolve_current_user(&state, &cookies).await {
        Ok(user) => {
            let messages = message_service::recent_messages(&state)
                .await?
                .into_iter()
                .map(MessageItem::from)
                .collect();

            let body = HomeTemplate {
                flash,
                username: user.username,
                user_id: user.id,
                messages,
            }
            .render()?;
            Ok(Html(body).into_response())
        }
        Err(_) => {
            let body = HomeAnonTemplate { flash }.render()?;
            Ok(Html(body).into_response())
        }
    }
}

/// A user's profile page. This is the redirect target of message create and
/// delete, so its listing is where those operations become observable.
#[axum::debug_handler]
pub async fn user_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    cookies: Cookies,
    Path(user_id): Path<i64>,
) -> Result<Response> {
    let user = user_repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let messages = message_service::user_messages(&state, user.id)
        .await?
        .into_iter()
        .map(|m| MessageItem {
            id: m.id,
            user_id: m.user_id,
            username: user.username.clone(),
            text: m.text,
            created_at: m.created_at.format("%d %B %Y").to_string(),
        })
        .collect();

    let body = ProfileTemplate {
        flash: flash::take(&cookies),
        username: user.username,
        user_id: user.id,
        image_url: user.image_url,
        can_delete: current.id == user.id,
        messages,
    }
    .render()?;

    Ok(Html(body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_listing_renders_messages() {
        let body = HomeTemplate {
            flash: None,
            username: "testuser".to_string(),
            user_id: 9000,
            messages: vec![MessageItem {
                id: 4321,
                user_id: 9000,
                username: "testuser".to_string(),
                text: "testing 123".to_string(),
                created_at: "01 January 2026".to_string(),
            }],
        }
        .render()
        .unwrap();

        assert!(body.contains(r#"<nav class="navbar navbar-expand">"#));
        assert!(body.contains("testing 123"));
        assert!(body.contains(r#"href="/messages/4321""#));
        assert!(body.contains("@testuser"));
    }

    #[test]
    fn flash_notice_is_rendered() {
        let body = HomeAnonTemplate {
            flash: Some(crate::flash::ACCESS_UNAUTHORIZED.to_string()),
        }
        .render()
        .unwrap();

        assert!(body.contains("Access unauthorized."));
    }

    #[test]
    fn profile_shows_delete_form_only_for_self() {
        let item = || MessageItem {
            id: 4321,
            user_id: 9000,
            username: "testuser".to_string(),
            text: "testing 123".to_string(),
            created_at: "01 January 2026".to_string(),
        };

        let own = ProfileTemplate {
            flash: None,
            username: "testuser".to_string(),
            user_id: 9000,
            image_url: None,
            can_delete: true,
            messages: vec![item()],
        }
        .render()
        .unwrap();
        assert!(own.contains(r#"action="/messages/4321/delete""#));

        let other = ProfileTemplate {
            flash: None,
            username: "testuser".to_string(),
            user_id: 9000,
            image_url: None,
            can_delete: false,
            messages: vec![item()],
        }
        .render()
        .unwrap();
        assert!(!other.contains(r#"action="/messages/4321/delete""#));
    }

    #[test]
    fn not_found_page_renders() {
        let body = NotFoundTemplate { flash: None }.render().unwrap();
        assert!(body.contains("404"));
    }
}
