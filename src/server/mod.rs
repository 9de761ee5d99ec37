//! HTTP API server.
//!
//! Thin JSON layer over the acquisition pipeline, message generator,
//! and campaign/lead stores.

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::acquisition::AcquisitionOrchestrator;
use crate::config::Settings;
use crate::llm::MessageClient;
use crate::store::{self, CampaignStore, LeadStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AcquisitionOrchestrator>,
    pub messages: Arc<MessageClient>,
    pub campaigns: CampaignStore,
    pub leads: LeadStore,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let pool = store::connect(&settings.database_url).await?;
        let proxy_pool = Arc::new(settings.proxy_pool());

        Ok(Self {
            orchestrator: Arc::new(settings.build_orchestrator(proxy_pool)),
            messages: Arc::new(MessageClient::new(settings.llm.clone())),
            campaigns: CampaignStore::new(pool.clone()),
            leads: LeadStore::new(pool),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
