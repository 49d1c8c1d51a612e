use chrono::{DateTime, Utc};
use tokio_postgres::Row;

use crate::error::{AppError, Result};

/// Represents a user in the system. Identity is immutable after signup.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's hashed password.
    pub password: String,
    /// An optional profile image URL.
    pub image_url: Option<String>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

/// The authenticated user resolved by the session guard, attached to the
/// request as an extension.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Maps a `tokio_postgres::Row` to a `User`.
pub fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        username: row.try_get("username").map_err(|_| AppError::MissingData("username".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
        image_url: row.try_get("image_url").map_err(|_| AppError::MissingData("image_url".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}
