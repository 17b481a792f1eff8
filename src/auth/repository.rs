use super::models::{Role, UserRow};
use sqlx::SqliteExecutor;

const USER_COLUMNS: &str = "user_id, username, email, password_hash";

pub async fn find_by_username<'e>(
    db: impl SqliteExecutor<'e>,
    username: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn email_taken<'e>(db: impl SqliteExecutor<'e>, email: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

pub async fn insert_user<'e>(
    db: impl SqliteExecutor<'e>,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_role<'e>(db: impl SqliteExecutor<'e>, user_id: i64, role: Role) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
        .bind(user_id)
        .bind(role.as_str())
        .execute(db)
        .await?;
    Ok(())
}

/// Roles of a user; unknown role strings are skipped.
pub async fn roles_of<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<Vec<Role>, sqlx::Error> {
    let rows: Vec<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows.iter().filter_map(|r| Role::parse(r)).collect())
}
