use crate::{
    error::{AppError, Result},
    models::{
        message::{Message, MessageWithAuthor},
        user::User,
    },
    repositories::{message as message_repo, user as user_repo},
    state::AppState,
};

/// How many messages the home listing shows.
pub const HOME_LISTING_LIMIT: i64 = 100;

/// Creates a new message owned by the given user.
pub async fn create_message(state: &AppState, user: &User, text: &str) -> Result<Message> {
    let message = message_repo::create_message(&state.db, user.id, text).await?;
    tracing::info!("✅ Message {} created by user {}", message.id, user.id);
    Ok(message)
}

/// Looks up a message together with its owner.
///
/// A message whose owner row is gone is reported as absent; messages are only
/// visible through a user that currently exists.
pub async fn get_message_with_owner(
    state: &AppState,
    message_id: i64,
) -> Result<Option<(Message, User)>> {
    let Some(message) = message_repo::find_by_id(&state.db, message_id).await? else {
        return Ok(None);
    };

    let Some(owner) = user_repo::find_by_id(&state.db, message.user_id).await? else {
        return Ok(None);
    };

    Ok(Some((message, owner)))
}

/// The ownership policy for deletion: only the owner may delete a message.
pub fn authorize_delete(message: &Message, user_id: i64) -> Result<()> {
    if !message.is_owned_by(user_id) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Deletes a message on behalf of the given user.
///
/// Fails with `NotFound` when the id has no backing message (including a
/// repeat delete of the same id), and with `Unauthorized` when the user is
/// not the owner. Neither failure mutates state.
pub async fn delete_message(state: &AppState, user: &User, message_id: i64) -> Result<()> {
    let message = message_repo::find_by_id(&state.db, message_id)
        .await?
        .ok_or(AppError::NotFound)?;

    authorize_delete(&message, user.id)?;

    let rows = message_repo::delete_message(&state.db, message_id).await?;
    if rows == 0 {
        // Lost a race with another delete of the same id.
        return Err(AppError::NotFound);
    }

    tracing::info!("✅ Message {} deleted by user {}", message_id, user.id);
    Ok(())
}

/// The most recent messages with their authors, for the home listing.
pub async fn recent_messages(state: &AppState) -> Result<Vec<MessageWithAuthor>> {
    message_repo::list_recent(&state.db, HOME_LISTING_LIMIT).await
}

/// A user's messages, newest first.
pub async fn user_messages(state: &AppState, user_id: i64) -> Result<Vec<Message>> {
    message_repo::list_by_user(&state.db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(owner: i64) -> Message {
        Message {
            id: 4321,
            user_id: owner,
            text: "testing 123".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_delete() {
        assert!(authorize_delete(&message(9000), 9000).is_ok());
    }

    #[test]
    fn non_owner_is_unauthorized() {
        let err = authorize_delete(&message(9000), 8787).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
