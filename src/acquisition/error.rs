//! Classified acquisition failures.
//!
//! Strategies never surface raw transport errors. Every failure is mapped
//! to a [`FailureKind`], and the orchestrator drives retry and fallback
//! decisions from the kind alone.

use thiserror::Error;

/// Failure classes recognized across all acquisition strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Malformed URL or missing required credential. Caller error, never
    /// retried anywhere.
    InvalidInput,
    /// Credential rejected or expired. Never retried within a strategy;
    /// the chain may still substitute a different session mechanism.
    AuthenticationRequired,
    /// The source is actively resisting automated access.
    BotDetectedOrBlocked,
    RateLimited,
    /// A bounded wait was exceeded or the transport failed outright.
    NetworkTimeout,
    /// The target profile does not exist. Terminal: no retry, no fallback.
    NotFound,
    /// Schema or extraction surprises. Terminal within the failing
    /// strategy, but the chain still advances.
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::AuthenticationRequired => "authentication_required",
            Self::BotDetectedOrBlocked => "bot_detected_or_blocked",
            Self::RateLimited => "rate_limited",
            Self::NetworkTimeout => "network_timeout",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a browser strategy may retry this failure with a fresh
    /// proxy. Authentication failures qualify because they only arise
    /// from the navigation auth-wall check, where a blocked egress point
    /// is indistinguishable from a dead session.
    pub fn retryable_with_proxy(&self) -> bool {
        matches!(
            self,
            Self::BotDetectedOrBlocked
                | Self::RateLimited
                | Self::NetworkTimeout
                | Self::AuthenticationRequired
        )
    }

    /// Whether this failure stops the fallback chain entirely.
    pub fn halts_chain(&self) -> bool {
        matches!(self, Self::InvalidInput | Self::NotFound)
    }
}

/// A classified acquisition failure.
#[derive(Debug, Clone, Error)]
#[error("{} ({})", .message, .kind.as_str())]
pub struct AcquisitionError {
    pub kind: FailureKind,
    pub message: String,
    /// Bounded diagnostic excerpt of the upstream payload, when one
    /// exists. Never the full body and never a credential.
    pub snippet: Option<String>,
}

/// Longest snippet we attach to an error.
const SNIPPET_LIMIT: usize = 300;

impl AcquisitionError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            snippet: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, message)
    }

    pub fn with_snippet(mut self, raw: &str) -> Self {
        self.snippet = Some(truncate_snippet(raw));
        self
    }

    /// Classify an arbitrary error message by its wording.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(classify_failure_text(&message), message)
    }
}

impl From<reqwest::Error> for AcquisitionError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() {
            FailureKind::NetworkTimeout
        } else {
            classify_failure_text(&err.to_string())
        };
        Self::new(kind, err.to_string())
    }
}

/// Best-effort classification of upstream error wording.
///
/// The recognized phrase set is open and coupled to an unversioned
/// external interface; nothing outside this function may inspect error
/// text. Unrecognized wording classifies as `Unknown`.
pub fn classify_failure_text(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("authentication required")
        || lower.contains("login required")
        || lower.contains("authwall")
    {
        FailureKind::AuthenticationRequired
    } else if lower.contains("proxy blocked")
        || lower.contains("access denied")
        || lower.contains("blocked")
        || lower.contains("captcha")
    {
        FailureKind::BotDetectedOrBlocked
    } else if lower.contains("rate limit") || lower.contains("too many requests") {
        FailureKind::RateLimited
    } else if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("net::err")
        || lower.contains("connection refused")
        || lower.contains("connection reset")
    {
        FailureKind::NetworkTimeout
    } else if lower.contains("not found") {
        FailureKind::NotFound
    } else {
        FailureKind::Unknown
    }
}

fn truncate_snippet(raw: &str) -> String {
    if raw.len() <= SNIPPET_LIMIT {
        return raw.to_string();
    }
    let mut end = SNIPPET_LIMIT;
    while end > 0 && !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}
