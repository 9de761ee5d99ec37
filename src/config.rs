//! Configuration management.
//!
//! Settings come from an optional TOML file with environment overrides
//! on top. Secrets (session cookie, API key) are environment-only by
//! convention and never carry compiled-in defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquisition::{
    AcquisitionOrchestrator, BrowserStrategy, BrowserStrategyConfig, DirectApiStrategy, Pacing,
    ProxyPool,
};
use crate::llm::LlmConfig;

/// Config file consulted when no explicit path is given.
const DEFAULT_CONFIG_FILE: &str = "leadforge.toml";

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default session credential, used when a request omits one.
    #[serde(skip_serializing)]
    pub session_cookie: Option<String>,

    /// JSON proxy list source. Absence disables proxy rotation.
    pub proxy_file: Option<PathBuf>,

    /// SQLite database URL.
    pub database_url: String,

    /// Default bind address for `serve`.
    pub bind: String,

    pub browser: BrowserStrategyConfig,

    pub pacing: Pacing,

    pub llm: LlmConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_cookie: None,
            proxy_file: None,
            database_url: "sqlite:leadforge.db".to_string(),
            bind: "127.0.0.1:5000".to_string(),
            browser: BrowserStrategyConfig::default(),
            pacing: Pacing::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings: explicit file if given, otherwise the default
    /// config file when present, otherwise defaults — then environment
    /// overrides in all cases.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Environment variables override file values.
    fn apply_env(&mut self) {
        if let Ok(cookie) = std::env::var("SESSION_COOKIE") {
            if !cookie.trim().is_empty() {
                self.session_cookie = Some(cookie);
            }
        }
        if let Ok(path) = std::env::var("PROXY_FILE") {
            if !path.trim().is_empty() {
                self.proxy_file = Some(PathBuf::from(path));
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database_url = url;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
    }

    /// Build the proxy pool from the configured source. No source or an
    /// unreadable one yields an empty pool (direct connections).
    pub fn proxy_pool(&self) -> ProxyPool {
        match &self.proxy_file {
            Some(path) => ProxyPool::load(path),
            None => ProxyPool::empty(),
        }
    }

    /// Assemble the full strategy chain from these settings.
    pub fn build_orchestrator(&self, pool: Arc<ProxyPool>) -> AcquisitionOrchestrator {
        AcquisitionOrchestrator::new(
            Box::new(BrowserStrategy::cookie(
                self.browser.clone(),
                self.pacing,
                pool.clone(),
            )),
            Box::new(BrowserStrategy::persistent(
                self.browser.clone(),
                self.pacing,
                pool,
            )),
            Box::new(DirectApiStrategy::new()),
        )
        .with_default_credential(self.session_cookie.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.database_url, "sqlite:leadforge.db");
        assert!(settings.session_cookie.is_none());
        assert!(settings.proxy_file.is_none());
        assert!(settings.browser.headless);
    }

    #[test]
    fn test_partial_toml_round_trip() {
        let settings: Settings = toml::from_str(
            r#"
            database_url = "sqlite:/tmp/test.db"

            [browser]
            headless = false
            navigation_timeout_secs = 90

            [pacing]
            retry_backoff = { min_ms = 0, max_ms = 0 }
            "#,
        )
        .unwrap();
        assert_eq!(settings.database_url, "sqlite:/tmp/test.db");
        assert!(!settings.browser.headless);
        assert_eq!(settings.browser.navigation_timeout_secs, 90);
        assert_eq!(settings.pacing.retry_backoff.max_ms, 0);
        // Unspecified sections keep defaults.
        assert_eq!(settings.bind, "127.0.0.1:5000");
        assert_eq!(settings.pacing.settle, Pacing::default().settle);
    }

    #[test]
    fn test_no_compiled_in_secrets() {
        let settings = Settings::default();
        assert!(settings.session_cookie.is_none());
        assert!(settings.llm.api_key.is_none());
    }
}
