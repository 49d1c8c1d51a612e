use askama::Template;
use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, DenyReason, Result},
    flash,
    models::user::CurrentUser,
    services::messages as message_service,
    state::AppState,
    validation::messages::validate_message_text,
};

/// The request payload for creating a message.
#[derive(Deserialize)]
pub struct NewMessageForm {
    pub text: String,
}

/// The message detail view.
#[derive(Template)]
#[template(path = "message_detail.html")]
pub struct MessageDetailTemplate {
    pub flash: Option<String>,
    pub message_id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub text: String,
    pub created_at: String,
    pub can_delete: bool,
}

/// Creates a new message owned by the current user and redirects to their
/// profile.
#[axum::debug_handler]
pub async fn new_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<NewMessageForm>,
) -> Result<Response> {
    validate_message_text(&form.text)?;

    message_service::create_message(&state, &user, &form.text).await?;

    Ok(flash::redirect_found(&format!("/users/{}", user.id)))
}

/// Shows a single message. Any authenticated user may view any message;
/// ownership only gates the delete affordance.
#[axum::debug_handler]
pub async fn show_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cookies: Cookies,
    Path(message_id): Path<i64>,
) -> Result<Response> {
    let (message, owner) = message_service::get_message_with_owner(&state, message_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let can_delete = message.is_owned_by(user.id);

    let body = MessageDetailTemplate {
        flash: flash::take(&cookies),
        message_id: message.id,
        owner_id: owner.id,
        owner_username: owner.username,
        text: message.text,
        created_at: message.created_at.format("%d %B %Y").to_string(),
        can_delete,
    }
    .render()?;

    Ok(Html(body).into_response())
}

/// Deletes a message. Only the owner may delete; a non-owner gets the
/// denial notice and the message is left untouched.
#[axum::debug_handler]
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cookies: Cookies,
    Path(message_id): Path<i64>,
) -> Result<Response> {
    match message_service::delete_message(&state, &user, message_id).await {
        Ok(()) => Ok(flash::redirect_found(&format!("/users/{}", user.id))),
        Err(AppError::Unauthorized) => Ok(flash::deny(&cookies, DenyReason::Unauthorized)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_view_carries_text_and_owner_link() {
        let body = MessageDetailTemplate {
            flash: None,
            message_id: 4321,
            owner_id: 9000,
            owner_username: "testuser".to_string(),
            text: "testing 123".to_string(),
            created_at: "01 January 2026".to_string(),
            can_delete: false,
        }
        .render()
        .unwrap();

        assert!(body.contains(r#"<nav class="navbar navbar-expand">"#));
        assert!(body.contains(r#"<a href="/users/9000">@testuser</a>"#));
        assert!(body.contains(r#"<p class="single-message">testing 123</p>"#));
        assert!(!body.contains(r#"action="/messages/4321/delete""#));
    }

    #[test]
    fn detail_view_offers_delete_to_owner() {
        let body = MessageDetailTemplate {
            flash: None,
            message_id: 4321,
            owner_id: 9000,
            owner_username: "testuser".to_string(),
            text: "testing 123".to_string(),
            created_at: "01 January 2026".to_string(),
            can_delete: true,
        }
        .render()
        .unwrap();

        assert!(body.contains(r#"action="/messages/4321/delete""#));
    }

    #[test]
    fn message_text_is_escaped() {
        let body = MessageDetailTemplate {
            flash: None,
            message_id: 1,
            owner_id: 1,
            owner_username: "testuser".to_string(),
            text: "<script>alert(1)</script>".to_string(),
            created_at: "01 January 2026".to_string(),
            can_delete: false,
        }
        .render()
        .unwrap();

        assert!(!body.contains("<script>alert(1)</script>"));
    }
}
