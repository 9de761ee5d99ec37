//! Personalized-message endpoints: the callers of the acquisition
//! pipeline and message generator.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::acquisition::AcquisitionOutcome;
use crate::models::ProfileRecord;

use super::super::error::ApiError;
use super::super::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageFromDataRequest {
    pub full_name: String,
    pub current_title: String,
    pub current_organization: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageOnlyResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageFromUrlRequest {
    pub profile_url: String,
    #[serde(default)]
    pub session_cookie: Option<String>,
    /// Allow the persistent-profile strategy to run without a cookie.
    #[serde(default)]
    pub prefer_persistent: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageFromUrlResponse {
    pub profile: ProfileRecord,
    pub message: String,
    /// Degraded-confidence flag: title or organization is missing.
    pub limited: bool,
    /// Which acquisition strategy produced the record.
    pub source: &'static str,
}

/// Generate a message from caller-supplied profile fields, skipping
/// acquisition entirely.
pub async fn message_from_data(
    State(state): State<AppState>,
    Json(request): Json<MessageFromDataRequest>,
) -> Result<Json<MessageOnlyResponse>, ApiError> {
    if request.full_name.trim().is_empty()
        || request.current_title.trim().is_empty()
        || request.current_organization.trim().is_empty()
    {
        return Err(ApiError::bad_request(
            "full_name, current_title, and current_organization are required",
        ));
    }

    let identifier = request
        .profile_url
        .as_deref()
        .and_then(|url| crate::acquisition::ProfileTarget::parse(url).ok())
        .map(|target| target.slug)
        .unwrap_or_default();

    let record = ProfileRecord {
        full_name: Some(request.full_name),
        headline: request.headline,
        current_title: Some(request.current_title),
        current_organization: Some(request.current_organization),
        location: request.location,
        summary: request.summary,
        ..ProfileRecord::new(identifier)
    };

    if let Some(url) = &request.profile_url {
        state.leads.upsert_detached(url.clone(), record.clone());
    }

    let message = state.messages.generate_message(&record).await;
    Ok(Json(MessageOnlyResponse { message }))
}

/// Acquire via the full fallback chain, then generate a message.
pub async fn message_from_url(
    State(state): State<AppState>,
    Json(request): Json<MessageFromUrlRequest>,
) -> Result<Json<MessageFromUrlResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .acquire(
            &request.profile_url,
            request.session_cookie.as_deref(),
            request.prefer_persistent,
        )
        .await?;
    respond_with_message(&state, &request.profile_url, outcome).await
}

/// Acquire via the direct API path only: faster, lower fidelity.
pub async fn message_from_url_api(
    State(state): State<AppState>,
    Json(request): Json<MessageFromUrlRequest>,
) -> Result<Json<MessageFromUrlResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .acquire_api_only(&request.profile_url, request.session_cookie.as_deref())
        .await?;
    respond_with_message(&state, &request.profile_url, outcome).await
}

/// Shared tail: fire-and-forget lead upsert, generate the message, and
/// return the record as-is — even a partial record is a success.
async fn respond_with_message(
    state: &AppState,
    profile_url: &str,
    outcome: AcquisitionOutcome,
) -> Result<Json<MessageFromUrlResponse>, ApiError> {
    state
        .leads
        .upsert_detached(profile_url.to_string(), outcome.record.clone());

    let message = state.messages.generate_message(&outcome.record).await;
    let limited = outcome.record.is_limited();

    Ok(Json(MessageFromUrlResponse {
        profile: outcome.record,
        message,
        limited,
        source: outcome.strategy,
    }))
}
