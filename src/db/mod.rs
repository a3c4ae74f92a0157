//! Database initialization and migration runner.

pub mod seed;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("src/db/migrations");

/// Initialize the SQLite connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the connection fails, or a
/// migration fails.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
