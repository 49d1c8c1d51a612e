use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Represents a message in the system.
#[derive(Debug, Clone)]
pub struct Message {
    /// The unique identifier for the message.
    pub id: i64,
    /// The ID of the user who owns the message. Never changes after creation.
    pub user_id: i64,
    /// The message text.
    pub text: String,
    /// The timestamp when the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether the given user owns this message.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

impl From<&Row> for Message {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            text: row.get("text"),
            created_at: row.get("created_at"),
        }
    }
}

/// A message joined with its author's username, for rendered listings.
#[derive(Debug, Clone)]
pub struct MessageWithAuthor {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for MessageWithAuthor {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            text: row.get("text"),
            created_at: row.get("created_at"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(owner: i64) -> Message {
        Message {
            id: 4321,
            user_id: owner,
            text: "testing 123".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ownership_matches_owner_only() {
        let m = message(9000);
        assert!(m.is_owned_by(9000));
        assert!(!m.is_owned_by(8787));
    }
}
