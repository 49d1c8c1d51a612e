use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a user session, stored JSON-serialized in Redis under
/// `session:{session_id}` and read-only to request handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: i64,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has passed its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let session = Session {
            user_id: 1,
            created_at: now - Duration::days(1),
            expires_at: now,
        };
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(1)));
    }
}
