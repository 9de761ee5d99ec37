//! Lead read handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::Lead;

use super::super::error::ApiError;
use super::super::AppState;

pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.leads.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct LeadByUrlParams {
    pub url: String,
}

pub async fn get_lead_by_url(
    State(state): State<AppState>,
    Query(params): Query<LeadByUrlParams>,
) -> Result<Json<Lead>, ApiError> {
    state
        .leads
        .get(&params.url)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("lead not found"))
}
