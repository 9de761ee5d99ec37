//! Campaign CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::models::Campaign;
use crate::store::{CampaignUpdate, EnrichedLead};

use super::super::error::ApiError;
use super::super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub leads: Vec<String>,
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("campaign name is required"));
    }

    let campaign = Campaign::new(request.name, request.description, request.leads);
    state.campaigns.create(&campaign).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    Ok(Json(state.campaigns.list().await?))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .campaigns
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("campaign not found"))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CampaignUpdate>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .campaigns
        .update(&id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("campaign not found"))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.campaigns.soft_delete(&id).await? {
        Ok(Json(json!({"message": "campaign deleted"})))
    } else {
        Err(ApiError::not_found("campaign not found"))
    }
}

/// A campaign's lead URLs joined with acquired profile data.
pub async fn enriched_leads(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EnrichedLead>>, ApiError> {
    let campaign = state
        .campaigns
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("campaign not found"))?;
    let enriched = state
        .campaigns
        .enriched_leads(&campaign, &state.leads)
        .await?;
    Ok(Json(enriched))
}
