//! Profile acquisition subsystem.
//!
//! Acquires structured profile data from an authentication-gated,
//! anti-automation source through three independent strategies —
//! cookie-injected headless browser, persistent browser profile, and a
//! direct private-API call — with an orchestrator driving the ordered
//! fallback between them.

pub mod api;
pub mod browser;
mod error;
mod orchestrator;
pub mod pacing;
pub mod proxy;
mod target;

pub use api::DirectApiStrategy;
pub use browser::{BrowserStrategy, BrowserStrategyConfig};
pub use error::{classify_failure_text, AcquisitionError, FailureKind};
pub use orchestrator::{AcquisitionOrchestrator, AcquisitionOutcome};
pub use pacing::{DelayBounds, Pacing};
pub use proxy::{ProxyEntry, ProxyPool};
pub use target::ProfileTarget;

use async_trait::async_trait;

use crate::models::ProfileRecord;

/// A request-scoped session secret for the target network.
///
/// Owned by the call stack of one acquisition request. Debug and Display
/// never reveal the value; logging sites must go through them.
#[derive(Clone, Default)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// An absent credential, acceptable only for the persistent-profile
    /// strategy.
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The raw secret, for composing authentication headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "SessionCredential(<empty>)")
        } else {
            write!(f, "SessionCredential(<redacted, {} chars>)", self.0.len())
        }
    }
}

/// One concrete technique for acquiring profile data.
///
/// Implementations classify every failure; raw transport errors never
/// cross this boundary.
#[async_trait]
pub trait AcquireStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
    ) -> Result<ProfileRecord, AcquisitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts() {
        let cred = SessionCredential::new("super-secret-token");
        let debugged = format!("{cred:?}");
        assert!(!debugged.contains("super-secret-token"));
        assert!(debugged.contains("redacted"));
        assert!(format!("{:?}", SessionCredential::none()).contains("empty"));
    }
}
