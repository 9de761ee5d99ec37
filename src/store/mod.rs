//! SQLite persistence for campaigns and leads.
//!
//! The acquisition subsystem never reads this state back; leads are
//! written via upsert semantics after a successful acquisition, always
//! best-effort from the caller's perspective.

mod campaigns;
mod leads;

pub use campaigns::{CampaignStore, CampaignUpdate, EnrichedLead};
pub use leads::LeadStore;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open (creating if missing) the database and ensure the schema exists.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables when absent. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            leads TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS leads (
            profile_url TEXT PRIMARY KEY,
            target_identifier TEXT NOT NULL,
            full_name TEXT,
            headline TEXT,
            current_title TEXT,
            current_organization TEXT,
            location TEXT,
            summary TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::from_str("sqlite::memory:").expect("memory sqlite options"),
        )
        .await
        .expect("in-memory pool");
    init_schema(&pool).await.expect("schema init");
    pool
}
