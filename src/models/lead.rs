//! Persisted lead records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored lead: the profile data last acquired for a URL, plus
/// bookkeeping timestamps. Keyed by `profile_url`, which is the same URL
/// campaigns reference in their lead lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub profile_url: String,
    pub target_identifier: String,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub current_title: Option<String>,
    pub current_organization: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
