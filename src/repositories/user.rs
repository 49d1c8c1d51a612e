use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    error::{AppError, Result},
    models::user::{User, row_to_user},
};

/// Creates a new user in the database.
///
/// A unique violation on username or email is reported as a validation
/// error rather than a database error.
pub async fn create_user(
    pool: &Pool,
    username: &str,
    email: &str,
    password_hash: &str,
    image_url: Option<&str>,
) -> Result<User> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            INSERT INTO users (username, email, password, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password, image_url, created_at
            "#,
        )
        .await?;

    match client
        .query_one(&stmt, &[&username, &email, &password_hash, &image_url])
        .await
    {
        Ok(row) => row_to_user(&row),
        Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => Err(AppError::Validation(
            "Username or email already taken".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: i64) -> Result<Option<User>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, username, email, password, image_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .await?;
    let row = client.query_opt(&stmt, &[&user_id]).await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their username.
pub async fn find_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            r#"
            SELECT id, username, email, password, image_url, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .await?;
    let row = client.query_opt(&stmt, &[&username]).await?;
    row.map(|r| row_to_user(&r)).transpose()
}
