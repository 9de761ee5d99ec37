//! Router configuration for the web server.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Campaigns
        .route(
            "/api/campaigns",
            post(handlers::create_campaign).get(handlers::list_campaigns),
        )
        .route(
            "/api/campaigns/:id",
            get(handlers::get_campaign)
                .put(handlers::update_campaign)
                .delete(handlers::delete_campaign),
        )
        .route("/api/campaigns/:id/leads", get(handlers::enriched_leads))
        // Leads
        .route("/api/leads", get(handlers::list_leads))
        .route("/api/leads/by-url", get(handlers::get_lead_by_url))
        // Personalized messages
        .route(
            "/api/personalized-message",
            post(handlers::message_from_data),
        )
        .route(
            "/api/personalized-message/from-url",
            post(handlers::message_from_url),
        )
        .route(
            "/api/personalized-message/from-url-api",
            post(handlers::message_from_url_api),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
