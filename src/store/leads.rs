//! Lead persistence, keyed by profile URL.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::models::{Lead, ProfileRecord};

type LeadRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const LEAD_COLUMNS: &str = "profile_url, target_identifier, full_name, headline, \
     current_title, current_organization, location, summary, created_at, updated_at";

/// Upsert-only store for acquired profile data.
#[derive(Clone)]
pub struct LeadStore {
    pool: SqlitePool,
}

impl LeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create-or-replace-fields upsert keyed by profile URL. The
    /// original creation timestamp survives updates.
    pub async fn upsert(
        &self,
        profile_url: &str,
        record: &ProfileRecord,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO leads (profile_url, target_identifier, full_name, headline, \
             current_title, current_organization, location, summary, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT(profile_url) DO UPDATE SET \
             target_identifier = excluded.target_identifier, \
             full_name = excluded.full_name, \
             headline = excluded.headline, \
             current_title = excluded.current_title, \
             current_organization = excluded.current_organization, \
             location = excluded.location, \
             summary = excluded.summary, \
             updated_at = excluded.updated_at",
        )
        .bind(profile_url)
        .bind(&record.target_identifier)
        .bind(&record.full_name)
        .bind(&record.headline)
        .bind(&record.current_title)
        .bind(&record.current_organization)
        .bind(&record.location)
        .bind(&record.summary)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fire-and-forget upsert: spawns the write, logs failures, never
    /// surfaces them to the caller.
    pub fn upsert_detached(&self, profile_url: String, record: ProfileRecord) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(e) = store.upsert(&profile_url, &record).await {
                warn!("Failed to save lead data for {}: {}", profile_url, e);
            }
        });
    }

    pub async fn get(&self, profile_url: &str) -> Result<Option<Lead>, sqlx::Error> {
        let row: Option<LeadRow> = sqlx::query_as(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE profile_url = ?1"
        ))
        .bind(profile_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_lead))
    }

    pub async fn list(&self) -> Result<Vec<Lead>, sqlx::Error> {
        let rows: Vec<LeadRow> = sqlx::query_as(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_lead).collect())
    }
}

fn row_to_lead(row: LeadRow) -> Lead {
    let (
        profile_url,
        target_identifier,
        full_name,
        headline,
        current_title,
        current_organization,
        location,
        summary,
        created_at,
        updated_at,
    ) = row;
    Lead {
        profile_url,
        target_identifier,
        full_name,
        headline,
        current_title,
        current_organization,
        location,
        summary,
        created_at,
        updated_at,
    }
}
