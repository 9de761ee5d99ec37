//! Leadforge — outreach campaign backend.
//!
//! Manages outreach campaigns and lead records, and generates
//! personalized messages from profile data acquired through a
//! multi-strategy, failure-tolerant pipeline: cookie-injected headless
//! browsing, a persistent authenticated browser profile, and a direct
//! private-API client, with ordered fallback between them.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;
pub mod utils;
