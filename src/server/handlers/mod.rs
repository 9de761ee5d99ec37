//! HTTP handlers.

mod campaigns;
mod leads;
mod messages;

pub use campaigns::{
    create_campaign, delete_campaign, enriched_leads, get_campaign, list_campaigns,
    update_campaign,
};
pub use leads::{get_lead_by_url, list_leads};
pub use messages::{message_from_data, message_from_url, message_from_url_api};

use axum::response::IntoResponse;

/// Health check.
pub async fn health() -> impl IntoResponse {
    "OK"
}
