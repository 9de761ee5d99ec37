//! Browser-based acquisition strategies.
//!
//! Two variants share the same page mechanics: the cookie strategy
//! injects the session credential into a fresh browser context per call;
//! the persistent strategy reuses an on-disk authenticated profile
//! directory instead. Both wrap each attempt in a retry loop that
//! rotates to a new proxy between attempts.

pub mod extract;
#[cfg(feature = "browser")]
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::ProfileRecord;

use super::error::AcquisitionError;
use super::pacing::Pacing;
use super::proxy::ProxyPool;
use super::target::ProfileTarget;
use super::{AcquireStrategy, SessionCredential};

/// Configuration shared by both browser strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserStrategyConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome executable; autodetected when absent.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Page navigation timeout in seconds.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Long-lived authenticated profile directory, used only by the
    /// persistent strategy. The directory, not the credential string,
    /// owns the authenticated state.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,
}

fn default_headless() -> bool {
    true
}

fn default_navigation_timeout() -> u64 {
    60
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from("./browser_profile")
}

impl Default for BrowserStrategyConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_executable: None,
            chrome_args: Vec::new(),
            navigation_timeout_secs: default_navigation_timeout(),
            profile_dir: default_profile_dir(),
        }
    }
}

/// Total attempts per strategy invocation, each on a fresh proxy.
const MAX_ATTEMPTS: usize = 3;

/// Headless-browser acquisition, cookie-injected or persistent.
pub struct BrowserStrategy {
    config: BrowserStrategyConfig,
    pacing: Pacing,
    pool: Arc<ProxyPool>,
    persistent: bool,
}

impl BrowserStrategy {
    /// Strategy that injects the session credential as a cookie into an
    /// isolated context per call.
    pub fn cookie(config: BrowserStrategyConfig, pacing: Pacing, pool: Arc<ProxyPool>) -> Self {
        Self {
            config,
            pacing,
            pool,
            persistent: false,
        }
    }

    /// Strategy that reuses the configured on-disk browser profile and
    /// therefore tolerates an empty credential.
    pub fn persistent(config: BrowserStrategyConfig, pacing: Pacing, pool: Arc<ProxyPool>) -> Self {
        Self {
            config,
            pacing,
            pool,
            persistent: true,
        }
    }
}

#[async_trait]
impl AcquireStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        if self.persistent {
            "browser-persistent"
        } else {
            "browser-cookie"
        }
    }

    async fn run(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
    ) -> Result<ProfileRecord, AcquisitionError> {
        if !self.persistent && credential.is_empty() {
            return Err(AcquisitionError::invalid_input(
                "session credential is required for cookie-based scraping",
            ));
        }

        let mut last_error: Option<AcquisitionError> = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Tear-down already happened; wait a humanized backoff
                // window before relaunching on the next proxy.
                self.pacing.pause(self.pacing.retry_backoff).await;
            }
            let proxy = self.pool.next();

            match self.attempt(target, credential, proxy).await {
                Ok(record) => return Ok(record),
                Err(err) => {
                    warn!(
                        strategy = self.name(),
                        attempt = attempt + 1,
                        kind = err.kind.as_str(),
                        "Acquisition attempt failed: {}",
                        err.message
                    );
                    let retryable = err.kind.retryable_with_proxy();
                    last_error = Some(err);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AcquisitionError::from_message("browser acquisition failed without an attempt")
        }))
    }
}

#[cfg(feature = "browser")]
impl BrowserStrategy {
    /// One full attempt: launch, drive, extract. The browser is closed on
    /// every exit path before the result propagates.
    async fn attempt(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
        proxy: Option<&super::proxy::ProxyEntry>,
    ) -> Result<ProfileRecord, AcquisitionError> {
        let profile_dir = self.persistent.then(|| self.config.profile_dir.clone());
        let session =
            session::BrowserSession::launch(&self.config, proxy, profile_dir.as_deref()).await?;
        let result = self.drive_page(&session, target, credential).await;
        session.close().await;
        result
    }

    async fn drive_page(
        &self,
        session: &session::BrowserSession,
        target: &ProfileTarget,
        credential: &SessionCredential,
    ) -> Result<ProfileRecord, AcquisitionError> {
        use std::time::Duration;

        use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
        use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
        use tracing::debug;

        use super::error::FailureKind;

        let page = session.new_page().await?;

        let user_agent = super::api::random_user_agent();
        page.execute(SetUserAgentOverrideParams::new(user_agent.to_string()))
            .await
            .map_err(|e| {
                AcquisitionError::from_message(format!("failed to set user agent: {e}"))
            })?;

        if !self.persistent {
            inject_session_cookies(&page, credential).await?;
        }

        debug!("Navigating to {}", target.url);
        let nav_params = NavigateParams::builder()
            .url(target.url.clone())
            .build()
            .map_err(|e| {
                AcquisitionError::new(FailureKind::Unknown, format!("invalid navigation: {e}"))
            })?;

        let nav_timeout = Duration::from_secs(self.config.navigation_timeout_secs);
        tokio::time::timeout(nav_timeout, page.execute(nav_params))
            .await
            .map_err(|_| {
                AcquisitionError::new(
                    FailureKind::NetworkTimeout,
                    format!("navigation to {} timed out", target.url),
                )
            })?
            .map_err(|e| AcquisitionError::from_message(format!("navigation failed: {e}")))?;

        wait_for_ready(&page, nav_timeout).await;
        self.pacing.pause(self.pacing.settle).await;

        let landed_url = page_url(&page).await.unwrap_or_else(|| target.url.clone());
        if landed_url.contains("/login") || landed_url.contains("/authwall") {
            return Err(AcquisitionError::new(
                FailureKind::AuthenticationRequired,
                "authentication required: redirected to login wall (session cookie invalid or expired)",
            ));
        }

        self.auto_scroll(&page).await;
        let after_scroll = page_url(&page).await.unwrap_or_else(|| landed_url.clone());
        if after_scroll != landed_url {
            return Err(AcquisitionError::new(
                FailureKind::Unknown,
                format!("navigation occurred during scroll ({landed_url} -> {after_scroll})"),
            ));
        }
        self.pacing.pause(self.pacing.post_scroll).await;

        expand_about(&page).await;
        self.pacing.pause(self.pacing.expand).await;

        let html = page.content().await.map_err(|e| {
            AcquisitionError::from_message(format!("failed to read page content: {e}"))
        })?;
        let _ = page.close().await;

        extract::extract_profile(&target.slug, &html)
    }

    /// Scroll in randomized increments until the content height stops
    /// growing, modeling infinite-scroll content loading.
    async fn auto_scroll(&self, page: &chromiumoxide::Page) {
        const MAX_STEPS: usize = 60;

        let mut last_height: i64 = 0;
        let mut stable_steps = 0;
        let mut scrolled: i64 = 0;

        for _ in 0..MAX_STEPS {
            let step = self.pacing.scroll_increment() as i64;
            let _ = page.evaluate(format!("window.scrollBy(0, {step})")).await;
            scrolled += step;
            self.pacing.pause(self.pacing.scroll_step).await;

            let height = match page.evaluate("document.body.scrollHeight".to_string()).await {
                Ok(result) => result.into_value::<i64>().unwrap_or(0),
                Err(_) => break,
            };
            if height == last_height {
                stable_steps += 1;
                if stable_steps >= 2 || scrolled >= height {
                    break;
                }
            } else {
                stable_steps = 0;
                last_height = height;
            }
        }
    }
}

#[cfg(not(feature = "browser"))]
impl BrowserStrategy {
    async fn attempt(
        &self,
        _target: &ProfileTarget,
        _credential: &SessionCredential,
        _proxy: Option<&super::proxy::ProxyEntry>,
    ) -> Result<ProfileRecord, AcquisitionError> {
        Err(AcquisitionError::from_message(
            "browser support not compiled; rebuild with the browser feature",
        ))
    }
}

/// Session cookies injected for the cookie strategy. The companion
/// cookies make the injected session look like a normal logged-in
/// browser rather than a bare token.
#[cfg(feature = "browser")]
async fn inject_session_cookies(
    page: &chromiumoxide::Page,
    credential: &SessionCredential,
) -> Result<(), AcquisitionError> {
    use chromiumoxide::cdp::browser_protocol::network::CookieParam;
    use rand::Rng;

    let ajax_id = format!("\"ajax:{:016x}\"", rand::thread_rng().gen::<u64>());
    let cookies: &[(&str, &str)] = &[
        ("li_at", credential.expose()),
        ("liap", "true"),
        ("lang", "en_US"),
        ("JSESSIONID", ajax_id.as_str()),
    ];

    for (name, value) in cookies {
        let param = CookieParam::builder()
            .name(*name)
            .value(*value)
            .domain(".linkedin.com")
            .build()
            .map_err(|e| {
                AcquisitionError::new(
                    super::error::FailureKind::Unknown,
                    format!("failed to build session cookie {name}: {e}"),
                )
            })?;
        page.set_cookie(param).await.map_err(|e| {
            AcquisitionError::from_message(format!("failed to set session cookie {name}: {e}"))
        })?;
    }
    Ok(())
}

/// Wait for the document to reach an interactive ready state, bounded by
/// the navigation timeout. Best-effort: a failure here means a non-HTML
/// page or a slow script, both handled downstream.
#[cfg(feature = "browser")]
async fn wait_for_ready(page: &chromiumoxide::Page, timeout: std::time::Duration) {
    use tracing::debug;

    let script = r#"
        new Promise((resolve) => {
            if (document.readyState === 'complete' || document.readyState === 'interactive') {
                resolve(document.readyState);
            } else {
                document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
                setTimeout(() => resolve('timeout'), 10000);
            }
        })
    "#;

    match tokio::time::timeout(timeout, page.evaluate(script.to_string())).await {
        Ok(Ok(result)) => {
            let state: String = result.into_value().unwrap_or_else(|_| "unknown".to_string());
            debug!("Page ready state: {}", state);
        }
        Ok(Err(e)) => debug!("Could not check ready state: {}", e),
        Err(_) => debug!("Timeout waiting for page ready state"),
    }
}

/// Best-effort expansion of the collapsed about section. Failure here is
/// never fatal; the summary just stays truncated.
#[cfg(feature = "browser")]
async fn expand_about(page: &chromiumoxide::Page) {
    use tracing::debug;

    const EXPAND_SELECTOR: &str = "#about + div .inline-show-more-text__button--light";

    let script = format!(
        r#"(() => {{
            const btn = document.querySelector('{EXPAND_SELECTOR}');
            if (btn) {{ btn.click(); return true; }}
            return false;
        }})()"#
    );
    match page.evaluate(script).await {
        Ok(result) => {
            if result.into_value::<bool>().unwrap_or(false) {
                debug!("Expanded about section");
            }
        }
        Err(e) => debug!("About expansion skipped: {}", e),
    }
}

#[cfg(feature = "browser")]
async fn page_url(page: &chromiumoxide::Page) -> Option<String> {
    page.url().await.ok().flatten().map(|u| u.to_string())
}
