//! Campaign persistence with soft deletion.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::{Campaign, CampaignStatus, Lead};

use super::LeadStore;

type CampaignRow = (
    String,
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

const CAMPAIGN_COLUMNS: &str = "id, name, description, status, leads, created_at, updated_at";

/// Fields a campaign update may change. Absent fields keep their value.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CampaignStatus>,
    pub leads: Option<Vec<String>>,
}

/// One campaign lead joined with whatever profile data has been
/// acquired for it so far.
#[derive(Debug, Serialize)]
pub struct EnrichedLead {
    pub profile_url: String,
    pub enriched: bool,
    pub data: Option<Lead>,
}

#[derive(Clone)]
pub struct CampaignStore {
    pool: SqlitePool,
}

impl CampaignStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, campaign: &Campaign) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO campaigns (id, name, description, status, leads, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(campaign.status.as_str())
        .bind(serde_json::to_string(&campaign.leads).unwrap_or_else(|_| "[]".to_string()))
        .bind(campaign.created_at)
        .bind(campaign.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All campaigns except soft-deleted ones.
    pub async fn list(&self) -> Result<Vec<Campaign>, sqlx::Error> {
        let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE status != 'deleted' \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_campaign).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Campaign>, sqlx::Error> {
        let row: Option<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1 AND status != 'deleted'"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_campaign))
    }

    /// Apply a partial update. Returns the updated campaign, or `None`
    /// when it does not exist (or was deleted).
    pub async fn update(
        &self,
        id: &str,
        update: CampaignUpdate,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let Some(mut campaign) = self.get(id).await? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            campaign.name = name;
        }
        if let Some(description) = update.description {
            campaign.description = description;
        }
        if let Some(status) = update.status {
            campaign.status = status;
        }
        if let Some(leads) = update.leads {
            campaign.leads = leads;
        }
        campaign.updated_at = Utc::now();

        sqlx::query(
            "UPDATE campaigns SET name = ?2, description = ?3, status = ?4, leads = ?5, \
             updated_at = ?6 WHERE id = ?1",
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(campaign.status.as_str())
        .bind(serde_json::to_string(&campaign.leads).unwrap_or_else(|_| "[]".to_string()))
        .bind(campaign.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Some(campaign))
    }

    /// Soft delete. Returns whether a live campaign was affected.
    pub async fn soft_delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = 'deleted', updated_at = ?2 \
             WHERE id = ?1 AND status != 'deleted'",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Join a campaign's lead URLs with their acquired profile data.
    pub async fn enriched_leads(
        &self,
        campaign: &Campaign,
        leads: &LeadStore,
    ) -> Result<Vec<EnrichedLead>, sqlx::Error> {
        let mut result = Vec::with_capacity(campaign.leads.len());
        for url in &campaign.leads {
            let data = leads.get(url).await?;
            result.push(EnrichedLead {
                profile_url: url.clone(),
                enriched: data.is_some(),
                data,
            });
        }
        Ok(result)
    }
}

fn row_to_campaign(row: CampaignRow) -> Campaign {
    let (id, name, description, status, leads, created_at, updated_at) = row;
    Campaign {
        id,
        name,
        description,
        status: CampaignStatus::from_str(&status).unwrap_or_default(),
        leads: serde_json::from_str(&leads).unwrap_or_default(),
        created_at,
        updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileRecord;
    use crate::store::test_pool;

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let store = CampaignStore::new(test_pool().await);
        let campaign = Campaign::new(
            "Q3 outreach",
            "Engineering leaders",
            vec!["https://www.linkedin.com/in/jane-doe".to_string()],
        );
        store.create(&campaign).await.unwrap();

        let loaded = store.get(&campaign.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Q3 outreach");
        assert_eq!(loaded.status, CampaignStatus::Active);
        assert_eq!(loaded.leads.len(), 1);
    }

    #[tokio::test]
    async fn test_update_applies_partial_changes() {
        let store = CampaignStore::new(test_pool().await);
        let campaign = Campaign::new("Before", "desc", vec![]);
        store.create(&campaign).await.unwrap();

        let updated = store
            .update(
                &campaign.id,
                CampaignUpdate {
                    name: Some("After".to_string()),
                    status: Some(CampaignStatus::Inactive),
                    ..CampaignUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.status, CampaignStatus::Inactive);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listing() {
        let store = CampaignStore::new(test_pool().await);
        let campaign = Campaign::new("Doomed", "desc", vec![]);
        store.create(&campaign).await.unwrap();

        assert!(store.soft_delete(&campaign.id).await.unwrap());
        assert!(store.get(&campaign.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        // Second delete is a no-op.
        assert!(!store.soft_delete(&campaign.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_enriched_leads_join() {
        let pool = test_pool().await;
        let campaigns = CampaignStore::new(pool.clone());
        let leads = LeadStore::new(pool);

        let known = "https://www.linkedin.com/in/jane-doe".to_string();
        let unknown = "https://www.linkedin.com/in/john-roe".to_string();
        let campaign = Campaign::new("Mixed", "desc", vec![known.clone(), unknown.clone()]);
        campaigns.create(&campaign).await.unwrap();

        let record = ProfileRecord {
            full_name: Some("Jane Doe".to_string()),
            ..ProfileRecord::new("jane-doe")
        };
        leads.upsert(&known, &record).await.unwrap();

        let enriched = campaigns.enriched_leads(&campaign, &leads).await.unwrap();
        assert_eq!(enriched.len(), 2);
        assert!(enriched[0].enriched);
        assert_eq!(
            enriched[0].data.as_ref().unwrap().full_name.as_deref(),
            Some("Jane Doe")
        );
        assert!(!enriched[1].enriched);
    }
}
