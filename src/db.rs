//! Connection pool construction and start-up data.

use crate::{
    auth::{helpers::hash_password, models::Role, repository as users},
    config::AdminAccount,
    error::ApiResult,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use std::{str::FromStr, time::Duration};

/// How long a connection waits on another writer's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the pool and applies pending migrations.
///
/// In-memory databases live only as long as their connection, so the pool is
/// pinned to a single connection that never expires. File databases run in
/// WAL mode so readers do not block the writer.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .min_connections(if in_memory { 1 } else { 0 })
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

    tracing::info!(event = "db.connected", url = %database_url, in_memory);
    Ok(pool)
}

/// Starts a transaction that takes the write lock up front.
///
/// A deferred transaction that reads first and writes later cannot wait out
/// a concurrent writer: SQLite fails the upgrade with `SQLITE_BUSY` at once.
/// `BEGIN IMMEDIATE` queues on `busy_timeout` instead.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Creates the configured administrator unless the username is already taken.
pub async fn bootstrap_admin(pool: &SqlitePool, admin: &AdminAccount, password_cost: u32) -> ApiResult<()> {
    if users::find_by_username(pool, &admin.username).await?.is_some() {
        tracing::debug!(event = "db.admin_present", username = %admin.username);
        return Ok(());
    }

    let hash = hash_password(&admin.password, password_cost)?;
    let mut tx = begin_write(pool).await?;
    let user_id = users::insert_user(&mut *tx, &admin.username, &admin.email, &hash).await?;
    for role in [Role::User, Role::Admin] {
        users::insert_role(&mut *tx, user_id, role).await?;
    }
    tx.commit().await?;

    tracing::info!(event = "db.admin_created", username = %admin.username, user_id);
    Ok(())
}
