use deadpool_postgres::Pool;

use crate::{
    error::Result,
    models::message::{Message, MessageWithAuthor},
};

/// Creates a new message owned by the given user.
pub async fn create_message(pool: &Pool, user_id: i64, text: &str) -> Result<Message> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            INSERT INTO messages (user_id, text)
            VALUES ($1, $2)
            RETURNING id, user_id, text, created_at
            "#,
        )
        .await?;
    let row = client.query_one(&stmt, &[&user_id, &text]).await?;
    Ok(Message::from(&row))
}

/// Finds a message by its ID.
pub async fn find_by_id(pool: &Pool, message_id: i64) -> Result<Option<Message>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, user_id, text, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .await?;
    let row = client.query_opt(&stmt, &[&message_id]).await?;
    Ok(row.as_ref().map(Message::from))
}

/// Deletes a message by its ID, returning the number of rows removed.
///
/// Zero rows means the message was already gone; a concurrent delete of the
/// same id resolves here rather than with a lock.
pub async fn delete_message(pool: &Pool, message_id: i64) -> Result<u64> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("DELETE FROM messages WHERE id = $1")
        .await?;
    let rows = client.execute(&stmt, &[&message_id]).await?;
    Ok(rows)
}

/// Lists the most recent messages with their authors, newest first.
pub async fn list_recent(pool: &Pool, limit: i64) -> Result<Vec<MessageWithAuthor>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT m.id, m.user_id, u.username, m.text, m.created_at
            FROM messages m
            JOIN users u ON u.id = m.user_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $1
            "#,
        )
        .await?;
    let rows = client.query(&stmt, &[&limit]).await?;
    Ok(rows.iter().map(MessageWithAuthor::from).collect())
}

/// Lists a user's messages, newest first.
pub async fn list_by_user(pool: &Pool, user_id: i64) -> Result<Vec<Message>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, user_id, text, created_at
            FROM messages
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .await?;
    let rows = client.query(&stmt, &[&user_id]).await?;
    Ok(rows.iter().map(Message::from).collect())
}
