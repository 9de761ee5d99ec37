//! Ordered fallback across acquisition strategies.
//!
//! The chain is an explicit state machine driven only by classified
//! failure kinds; strategy-internal detail never influences progression.

use tracing::{info, warn};

use crate::models::ProfileRecord;

use super::error::AcquisitionError;
use super::target::ProfileTarget;
use super::{AcquireStrategy, SessionCredential};

/// Position in the fixed strategy order.
///
/// Cookie-injected browsing runs first because it yields the richest
/// page-rendered data. The persistent profile is the second attempt for
/// every failure class that does not halt the chain — it exists exactly
/// to work around expired cookies with separately maintained login
/// state. The direct API runs last: a different transport entirely, so
/// it may succeed when browser automation is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Cookie,
    Persistent,
    DirectApi,
}

fn next_slot(slot: Slot) -> Option<Slot> {
    match slot {
        Slot::Cookie => Some(Slot::Persistent),
        Slot::Persistent => Some(Slot::DirectApi),
        Slot::DirectApi => None,
    }
}

/// Progress of one acquisition through the chain.
enum ChainState {
    Pending(Slot),
    Trying(Slot),
    Succeeded(AcquisitionOutcome),
    Exhausted(AcquisitionError),
}

/// A successful acquisition: the normalized record plus the strategy
/// that produced it.
#[derive(Debug, Clone)]
pub struct AcquisitionOutcome {
    pub record: ProfileRecord,
    pub strategy: &'static str,
}

/// Drives the strategy chain for one acquisition request at a time.
pub struct AcquisitionOrchestrator {
    cookie: Box<dyn AcquireStrategy>,
    persistent: Box<dyn AcquireStrategy>,
    direct_api: Box<dyn AcquireStrategy>,
    default_credential: Option<String>,
}

impl AcquisitionOrchestrator {
    pub fn new(
        cookie: Box<dyn AcquireStrategy>,
        persistent: Box<dyn AcquireStrategy>,
        direct_api: Box<dyn AcquireStrategy>,
    ) -> Self {
        Self {
            cookie,
            persistent,
            direct_api,
            default_credential: None,
        }
    }

    /// Process-wide default credential, used when a caller omits one.
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential;
        self
    }

    /// Acquire a profile through the full fallback chain.
    ///
    /// At most one strategy executes to success; earlier attempts'
    /// partial data is discarded, never merged. When every strategy
    /// fails, the FIRST strategy's error is returned (it carries the
    /// most informative diagnostic), except that a chain-halting failure
    /// (`NotFound`, `InvalidInput`) propagates as-is.
    pub async fn acquire(
        &self,
        url: &str,
        credential: Option<&str>,
        prefer_persistent: bool,
    ) -> Result<AcquisitionOutcome, AcquisitionError> {
        let target = ProfileTarget::parse(url)?;
        let credential = self.resolve_credential(credential);
        if credential.is_empty() && !prefer_persistent {
            return Err(AcquisitionError::invalid_input(
                "either a session credential or the persistent session is required",
            ));
        }

        // Without a credential there is nothing to inject; the chain
        // starts at the persistent profile instead.
        let first = if credential.is_empty() {
            Slot::Persistent
        } else {
            Slot::Cookie
        };

        let mut first_error: Option<AcquisitionError> = None;
        let mut state = ChainState::Pending(first);

        loop {
            state = match state {
                ChainState::Pending(slot) => ChainState::Trying(slot),
                ChainState::Trying(slot) => {
                    let strategy = self.strategy(slot);
                    info!(
                        strategy = strategy.name(),
                        "Trying acquisition strategy for {}", target.slug
                    );
                    match strategy.run(&target, &credential).await {
                        Ok(record) => ChainState::Succeeded(AcquisitionOutcome {
                            record,
                            strategy: strategy.name(),
                        }),
                        Err(err) => {
                            warn!(
                                strategy = strategy.name(),
                                kind = err.kind.as_str(),
                                "Strategy failed: {}",
                                err.message
                            );
                            if err.kind.halts_chain() {
                                ChainState::Exhausted(err)
                            } else {
                                let first_err = first_error.get_or_insert(err);
                                match next_slot(slot) {
                                    Some(next) => ChainState::Trying(next),
                                    None => ChainState::Exhausted(first_err.clone()),
                                }
                            }
                        }
                    }
                }
                ChainState::Succeeded(outcome) => {
                    info!(
                        strategy = outcome.strategy,
                        limited = outcome.record.is_limited(),
                        "Acquired profile {}",
                        target.slug
                    );
                    return Ok(outcome);
                }
                ChainState::Exhausted(err) => return Err(err),
            };
        }
    }

    /// Direct-API-only path: faster, lower fidelity, requires an
    /// explicit credential.
    pub async fn acquire_api_only(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<AcquisitionOutcome, AcquisitionError> {
        let target = ProfileTarget::parse(url)?;
        let credential = self.resolve_credential(credential);
        if credential.is_empty() {
            return Err(AcquisitionError::invalid_input(
                "session credential is required for the direct API path",
            ));
        }

        let record = self.direct_api.run(&target, &credential).await?;
        Ok(AcquisitionOutcome {
            record,
            strategy: self.direct_api.name(),
        })
    }

    fn strategy(&self, slot: Slot) -> &dyn AcquireStrategy {
        match slot {
            Slot::Cookie => self.cookie.as_ref(),
            Slot::Persistent => self.persistent.as_ref(),
            Slot::DirectApi => self.direct_api.as_ref(),
        }
    }

    fn resolve_credential(&self, explicit: Option<&str>) -> SessionCredential {
        match explicit {
            Some(value) if !value.trim().is_empty() => SessionCredential::new(value),
            _ => self
                .default_credential
                .as_deref()
                .map(SessionCredential::new)
                .unwrap_or_else(SessionCredential::none),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::super::error::FailureKind;
    use super::*;

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct StubStrategy {
        name: &'static str,
        result: Result<ProfileRecord, AcquisitionError>,
        log: CallLog,
    }

    #[async_trait]
    impl AcquireStrategy for StubStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(
            &self,
            _target: &ProfileTarget,
            _credential: &SessionCredential,
        ) -> Result<ProfileRecord, AcquisitionError> {
            self.log.lock().unwrap().push(self.name);
            self.result.clone()
        }
    }

    fn record(name: &str) -> ProfileRecord {
        ProfileRecord {
            full_name: Some(name.to_string()),
            current_title: Some("Engineer".to_string()),
            current_organization: Some("Acme".to_string()),
            ..ProfileRecord::new("jane-doe")
        }
    }

    fn orchestrator(
        cookie: Result<ProfileRecord, AcquisitionError>,
        persistent: Result<ProfileRecord, AcquisitionError>,
        api: Result<ProfileRecord, AcquisitionError>,
    ) -> (AcquisitionOrchestrator, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = AcquisitionOrchestrator::new(
            Box::new(StubStrategy {
                name: "cookie",
                result: cookie,
                log: log.clone(),
            }),
            Box::new(StubStrategy {
                name: "persistent",
                result: persistent,
                log: log.clone(),
            }),
            Box::new(StubStrategy {
                name: "api",
                result: api,
                log: log.clone(),
            }),
        );
        (orchestrator, log)
    }

    fn failure(kind: FailureKind, message: &str) -> AcquisitionError {
        AcquisitionError::new(kind, message)
    }

    const URL: &str = "https://www.linkedin.com/in/jane-doe";

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let (orch, log) = orchestrator(
            Ok(record("from cookie")),
            Ok(record("from persistent")),
            Ok(record("from api")),
        );
        let outcome = orch.acquire(URL, Some("tok123"), false).await.unwrap();
        assert_eq!(outcome.record.full_name.as_deref(), Some("from cookie"));
        assert_eq!(outcome.strategy, "cookie");
        assert_eq!(*log.lock().unwrap(), vec!["cookie"]);
    }

    #[tokio::test]
    async fn test_at_most_one_success_no_merge() {
        // Cookie and API would both succeed with different records; the
        // result is exactly the first strategy's record.
        let mut cookie_record = record("cookie wins");
        cookie_record.location = None;
        let (orch, log) = orchestrator(
            Ok(cookie_record.clone()),
            Err(failure(FailureKind::Unknown, "unused")),
            Ok(record("api record")),
        );
        let outcome = orch.acquire(URL, Some("tok123"), false).await.unwrap();
        assert_eq!(outcome.record, cookie_record);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_reaches_api_in_order() {
        let (orch, log) = orchestrator(
            Err(failure(FailureKind::BotDetectedOrBlocked, "blocked")),
            Err(failure(FailureKind::NetworkTimeout, "timeout")),
            Ok(record("from api")),
        );
        let outcome = orch.acquire(URL, Some("tok123"), false).await.unwrap();
        assert_eq!(outcome.strategy, "api");
        assert_eq!(*log.lock().unwrap(), vec!["cookie", "persistent", "api"]);
    }

    #[tokio::test]
    async fn test_persistent_runs_for_every_non_halting_failure_class() {
        for kind in [
            FailureKind::AuthenticationRequired,
            FailureKind::BotDetectedOrBlocked,
            FailureKind::RateLimited,
            FailureKind::NetworkTimeout,
            FailureKind::Unknown,
        ] {
            let (orch, log) = orchestrator(
                Err(failure(kind, "first failure")),
                Ok(record("from persistent")),
                Ok(record("from api")),
            );
            let outcome = orch.acquire(URL, Some("tok123"), false).await.unwrap();
            assert_eq!(outcome.strategy, "persistent", "{kind:?}");
            assert_eq!(*log.lock().unwrap(), vec!["cookie", "persistent"], "{kind:?}");
        }
    }

    #[tokio::test]
    async fn test_not_found_halts_chain() {
        let (orch, log) = orchestrator(
            Err(failure(FailureKind::NotFound, "profile not found: jane-doe")),
            Ok(record("unused")),
            Ok(record("unused")),
        );
        let err = orch.acquire(URL, Some("tok123"), false).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::NotFound);
        assert_eq!(*log.lock().unwrap(), vec!["cookie"]);
    }

    #[tokio::test]
    async fn test_all_fail_returns_first_error() {
        let (orch, log) = orchestrator(
            Err(failure(FailureKind::AuthenticationRequired, "cookie error text")),
            Err(failure(FailureKind::AuthenticationRequired, "persistent error text")),
            Err(failure(FailureKind::AuthenticationRequired, "api error text")),
        );
        let err = orch.acquire(URL, Some("tok123"), false).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::AuthenticationRequired);
        assert_eq!(err.message, "cookie error text");
        assert_eq!(*log.lock().unwrap(), vec!["cookie", "persistent", "api"]);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_strategy() {
        let (orch, log) = orchestrator(
            Ok(record("unused")),
            Ok(record("unused")),
            Ok(record("unused")),
        );
        let err = orch
            .acquire("https://example.com/profile/jane", Some("tok123"), false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidInput);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_requires_persistent_opt_in() {
        let (orch, log) = orchestrator(
            Ok(record("unused")),
            Ok(record("from persistent")),
            Ok(record("unused")),
        );
        let err = orch.acquire(URL, None, false).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidInput);
        assert!(log.lock().unwrap().is_empty());

        // With the persistent opt-in, the chain starts at the profile
        // strategy since there is no cookie to inject.
        let outcome = orch.acquire(URL, None, true).await.unwrap();
        assert_eq!(outcome.strategy, "persistent");
        assert_eq!(*log.lock().unwrap(), vec!["persistent"]);
    }

    #[tokio::test]
    async fn test_default_credential_used_when_caller_omits() {
        let (orch, log) = orchestrator(
            Ok(record("from cookie")),
            Ok(record("unused")),
            Ok(record("unused")),
        );
        let orch = orch.with_default_credential(Some("env-token".to_string()));
        let outcome = orch.acquire(URL, None, false).await.unwrap();
        assert_eq!(outcome.strategy, "cookie");
        assert_eq!(*log.lock().unwrap(), vec!["cookie"]);
    }

    #[tokio::test]
    async fn test_api_only_path_skips_browser_strategies() {
        let (orch, log) = orchestrator(
            Ok(record("unused")),
            Ok(record("unused")),
            Ok(record("from api")),
        );
        let outcome = orch.acquire_api_only(URL, Some("tok123")).await.unwrap();
        assert_eq!(outcome.strategy, "api");
        assert_eq!(*log.lock().unwrap(), vec!["api"]);

        let err = orch.acquire_api_only(URL, None).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidInput);
    }
}
