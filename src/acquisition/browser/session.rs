//! Scoped browser lifecycle for one acquisition attempt.
//!
//! Each attempt owns an isolated browser process; [`BrowserSession::close`]
//! must be reachable from every exit path, including retries.

use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tracing::{debug, info};

use super::super::error::{AcquisitionError, FailureKind};
use super::super::proxy::ProxyEntry;
use super::BrowserStrategyConfig;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// One launched browser process plus its CDP handler task.
pub(crate) struct BrowserSession {
    browser: Option<Browser>,
}

impl BrowserSession {
    /// Launch an isolated browser, optionally routed through a proxy and
    /// optionally reusing a persistent profile directory.
    pub(crate) async fn launch(
        config: &BrowserStrategyConfig,
        proxy: Option<&ProxyEntry>,
        profile_dir: Option<&Path>,
    ) -> Result<Self, AcquisitionError> {
        let chrome_path = match &config.chrome_executable {
            Some(path) => path.clone(),
            None => find_chrome()?,
        };

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(proxy) = proxy {
            debug!("Routing browser through proxy {}", proxy.server_url());
            builder = builder.arg(format!("--proxy-server={}", proxy.server_url()));
        }

        if let Some(dir) = profile_dir {
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--window-size=1280,800")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder.build().map_err(|e| {
            AcquisitionError::new(
                FailureKind::Unknown,
                format!("failed to build browser config: {e}"),
            )
        })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AcquisitionError::from_message(format!("failed to launch browser: {e}")))?;

        // Handler task ends when the browser's CDP stream closes.
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
        })
    }

    pub(crate) async fn new_page(&self) -> Result<Page, AcquisitionError> {
        let browser = self.browser.as_ref().ok_or_else(|| {
            AcquisitionError::new(FailureKind::Unknown, "browser session already closed")
        })?;
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| AcquisitionError::from_message(format!("failed to open page: {e}")))
    }

    /// Tear the browser process down. Dropping the handle closes the CDP
    /// connection and kills the child process.
    pub(crate) async fn close(mut self) {
        self.browser = None;
    }
}

/// Find a Chrome executable on this host.
fn find_chrome() -> Result<std::path::PathBuf, AcquisitionError> {
    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found Chrome in PATH: {}", path);
                    return Ok(std::path::PathBuf::from(path));
                }
            }
        }
    }

    Err(AcquisitionError::new(
        FailureKind::Unknown,
        "Chrome/Chromium not found; install it or set browser.chrome_executable",
    ))
}
