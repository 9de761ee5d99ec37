//! Direct private-API acquisition strategy.
//!
//! Bypasses the browser entirely: one unauthenticated page fetch to
//! harvest the anti-forgery token from the session cookie, then one
//! authenticated call to the internal profile endpoint. Single attempt,
//! no proxy use; the payload schema is not contractually stable, so
//! extraction runs an ordered list of fallback extractors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};

use crate::models::ProfileRecord;
use crate::utils::text::clean_text;

use super::error::{AcquisitionError, FailureKind};
use super::target::ProfileTarget;
use super::{AcquireStrategy, SessionCredential};

const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";
const PROFILE_DECORATION: &str =
    "com.linkedin.voyager.dash.deco.identity.profile.FullProfileWithEntities-101";
const PROFILE_TYPE: &str = "com.linkedin.voyager.dash.identity.profile.Profile";
const POSITION_TYPE: &str = "com.linkedin.voyager.dash.identity.profile.Position";

/// Real browser user agents, rotated per call to reduce fingerprinting.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/123.0.0.0 Safari/537.36",
];

pub(crate) fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Session state harvested from the unauthenticated token request.
struct HarvestedSession {
    /// The anti-forgery token (cookie value, quotes stripped).
    csrf_token: String,
    /// The full `JSESSIONID=...` cookie pair for the data request.
    cookie_pair: String,
}

/// Acquisition via the internal structured-data endpoint.
pub struct DirectApiStrategy {
    base_url: String,
    timeout: Duration,
}

impl Default for DirectApiStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectApiStrategy {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Point the strategy at a different host (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Fetch and parse a profile.
    pub async fn fetch(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
    ) -> Result<ProfileRecord, AcquisitionError> {
        if credential.is_empty() {
            return Err(AcquisitionError::invalid_input(
                "session credential is required for the direct API path",
            ));
        }

        let user_agent = random_user_agent();
        debug!("Fetching profile {} via data API", target.slug);

        let session = self.harvest_session(user_agent).await?;
        let payload = self
            .fetch_payload(target, credential, &session, user_agent)
            .await?;
        let record = parse_profile(&target.slug, &payload)?;

        info!("Data API acquisition succeeded for {}", target.slug);
        Ok(record)
    }

    /// Step 1: unauthenticated GET purely to collect the session cookie
    /// that carries the anti-forgery token.
    async fn harvest_session(&self, user_agent: &str) -> Result<HarvestedSession, AcquisitionError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .user_agent(user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| AcquisitionError::new(FailureKind::Unknown, e.to_string()))?;

        let url = format!("{}/feed/", self.base_url);
        let response = client
            .get(&url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        // Preferred source: the cookie jar after redirects settled.
        if let Ok(base) = url::Url::parse(&self.base_url) {
            if let Some(header) = jar.cookies(&base) {
                if let Some(session) = header.to_str().ok().and_then(extract_session_cookie) {
                    return Ok(session);
                }
            }
        }

        // Fallback: raw Set-Cookie headers on the final response.
        for value in response.headers().get_all(SET_COOKIE) {
            if let Some(session) = value.to_str().ok().and_then(extract_session_cookie) {
                return Ok(session);
            }
        }

        Err(AcquisitionError::new(
            FailureKind::Unknown,
            "JSESSIONID cookie not found in token-harvest response",
        ))
    }

    /// Step 2: authenticated GET against the internal profile endpoint.
    async fn fetch_payload(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
        session: &HarvestedSession,
        user_agent: &str,
    ) -> Result<Value, AcquisitionError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| AcquisitionError::new(FailureKind::Unknown, e.to_string()))?;

        let url = format!(
            "{}/voyager/api/identity/dash/profiles?q=memberIdentity&memberIdentity={}&decorationId={}&count=100",
            self.base_url,
            urlencoding::encode(&target.slug),
            PROFILE_DECORATION,
        );
        let cookie_header = format!("li_at={}; {}", credential.expose(), session.cookie_pair);

        let response = client
            .get(&url)
            .header(ACCEPT, "application/vnd.linkedin.normalized+json+2.1")
            .header("x-restli-protocol-version", "2.0.0")
            .header("csrf-token", &session.csrf_token)
            .header(COOKIE, cookie_header)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AcquisitionError::new(
                    FailureKind::AuthenticationRequired,
                    format!(
                        "session credential rejected for {} (status {})",
                        target.slug,
                        status.as_u16()
                    ),
                ));
            }
            StatusCode::NOT_FOUND => {
                return Err(AcquisitionError::new(
                    FailureKind::NotFound,
                    format!("profile not found: {}", target.slug),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AcquisitionError::new(
                    FailureKind::RateLimited,
                    format!("rate limited while fetching {}", target.slug),
                ));
            }
            _ if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AcquisitionError::new(
                    FailureKind::Unknown,
                    format!("unexpected status {} from profile endpoint", status.as_u16()),
                )
                .with_snippet(&body));
            }
            _ => {}
        }

        response.json::<Value>().await.map_err(|e| {
            AcquisitionError::new(
                FailureKind::Unknown,
                format!("profile endpoint returned unparsable JSON: {e}"),
            )
        })
    }
}

#[async_trait]
impl AcquireStrategy for DirectApiStrategy {
    fn name(&self) -> &'static str {
        "direct-api"
    }

    async fn run(
        &self,
        target: &ProfileTarget,
        credential: &SessionCredential,
    ) -> Result<ProfileRecord, AcquisitionError> {
        self.fetch(target, credential).await
    }
}

/// Pull the JSESSIONID pair out of a cookie or Set-Cookie header value.
fn extract_session_cookie(header: &str) -> Option<HarvestedSession> {
    let pair = header
        .split(';')
        .map(str::trim)
        .find(|part| part.starts_with("JSESSIONID="))?;
    let raw_value = pair.strip_prefix("JSESSIONID=")?;
    let token = raw_value.trim_matches('"');
    if token.is_empty() {
        return None;
    }
    Some(HarvestedSession {
        csrf_token: token.to_string(),
        cookie_pair: pair.to_string(),
    })
}

/// Parse the semi-structured profile payload.
///
/// Field locations vary between payload generations, so extraction tries
/// an ordered list of shapes and the first one yielding a usable field
/// wins. Failing all of them is a schema surprise, reported with a
/// bounded excerpt of the payload.
fn parse_profile(slug: &str, payload: &Value) -> Result<ProfileRecord, AcquisitionError> {
    let extractors: &[fn(&Value) -> Option<&Value>] = &[
        extract_included_profile,
        extract_first_element,
        extract_top_level,
        extract_data_object,
    ];

    let info = extractors
        .iter()
        .find_map(|extract| extract(payload).filter(|v| has_usable_field(v)))
        .ok_or_else(|| {
            AcquisitionError::new(
                FailureKind::Unknown,
                format!("no profile data found in payload for {slug}"),
            )
            .with_snippet(&payload.to_string())
        })?;

    let mut record = ProfileRecord::new(slug);
    record.full_name = resolve_full_name(info, payload);
    record.headline = string_field(info, "headline").or_else(|| string_field(payload, "headline"));
    record.summary = string_field(info, "summary");
    record.location = resolve_location(info, payload);

    if let Some((title, organization)) = extract_current_position(payload) {
        record.current_title = title;
        record.current_organization = organization;
    }

    Ok(record)
}

/// Shape (a): typed entity in the `included` collection.
fn extract_included_profile(payload: &Value) -> Option<&Value> {
    payload
        .get("included")?
        .as_array()?
        .iter()
        .find(|item| item.get("$type").and_then(Value::as_str) == Some(PROFILE_TYPE))
}

/// Shape (b): first entry of the `elements` collection.
fn extract_first_element(payload: &Value) -> Option<&Value> {
    payload.get("elements")?.as_array()?.first()
}

/// Shape (c): name fields directly on the response.
fn extract_top_level(payload: &Value) -> Option<&Value> {
    const NAME_KEYS: &[&str] = &["firstName", "lastName", "fullName"];
    if NAME_KEYS.iter().any(|key| payload.get(key).is_some()) {
        Some(payload)
    } else {
        None
    }
}

/// Shape (d): nested `data` object.
fn extract_data_object(payload: &Value) -> Option<&Value> {
    payload.get("data").filter(|data| data.is_object())
}

fn has_usable_field(info: &Value) -> bool {
    const USABLE: &[&str] = &["firstName", "lastName", "fullName", "headline", "summary"];
    USABLE
        .iter()
        .any(|key| info.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty()))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).and_then(clean_text)
}

fn resolve_full_name(info: &Value, payload: &Value) -> Option<String> {
    let first = info.get("firstName").and_then(Value::as_str).unwrap_or("");
    let last = info.get("lastName").and_then(Value::as_str).unwrap_or("");
    clean_text(&format!("{first} {last}"))
        .or_else(|| string_field(info, "fullName"))
        .or_else(|| string_field(payload, "fullName"))
}

/// Location is either a plain string field or an entity reference into
/// the `included` collection.
fn resolve_location(info: &Value, payload: &Value) -> Option<String> {
    let location = info.get("location")?;
    if let Some(urn) = location.get("*geo").and_then(Value::as_str) {
        let resolved = payload
            .get("included")
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item.get("entityUrn").and_then(Value::as_str) == Some(urn))
            })
            .and_then(|geo| string_field(geo, "defaultLocalizedName"));
        if resolved.is_some() {
            return resolved;
        }
    }
    string_field(location, "locationName")
}

/// Find the current position among the `included` experience entries:
/// the entry with no end date, or the first entry when all are closed.
fn extract_current_position(payload: &Value) -> Option<(Option<String>, Option<String>)> {
    let positions: Vec<&Value> = payload
        .get("included")?
        .as_array()?
        .iter()
        .filter(|item| item.get("$type").and_then(Value::as_str) == Some(POSITION_TYPE))
        .collect();
    if positions.is_empty() {
        return None;
    }

    let current = positions
        .iter()
        .find(|position| position.get("endDate").map_or(true, Value::is_null))
        .unwrap_or(&positions[0]);

    Some((
        string_field(current, "title"),
        string_field(current, "companyName"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_included_profile_shape() {
        let payload = json!({
            "included": [
                {
                    "$type": PROFILE_TYPE,
                    "firstName": "Jane",
                    "lastName": "Doe",
                    "headline": "Staff Engineer",
                    "summary": "Builds things.",
                    "location": {"*geo": "urn:li:fsd_geo:12345"}
                },
                {
                    "entityUrn": "urn:li:fsd_geo:12345",
                    "defaultLocalizedName": "Berlin, Germany"
                },
                {
                    "$type": POSITION_TYPE,
                    "title": "Staff Engineer",
                    "companyName": "Acme",
                    "endDate": null
                },
                {
                    "$type": POSITION_TYPE,
                    "title": "Engineer",
                    "companyName": "Initech",
                    "endDate": {"year": 2021}
                }
            ]
        });

        let record = parse_profile("jane-doe", &payload).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.headline.as_deref(), Some("Staff Engineer"));
        assert_eq!(record.summary.as_deref(), Some("Builds things."));
        assert_eq!(record.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(record.current_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(record.current_organization.as_deref(), Some("Acme"));
        assert!(!record.is_limited());
    }

    #[test]
    fn test_parse_elements_shape() {
        let payload = json!({
            "elements": [
                {"firstName": "Sam", "lastName": "Lee", "headline": "Designer"}
            ]
        });
        let record = parse_profile("sam-lee", &payload).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Sam Lee"));
        assert_eq!(record.headline.as_deref(), Some("Designer"));
        assert!(record.is_limited());
    }

    #[test]
    fn test_parse_top_level_shape() {
        let payload = json!({"fullName": "Ada Lovelace", "headline": "Analyst"});
        let record = parse_profile("ada", &payload).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_parse_nested_data_shape() {
        let payload = json!({"data": {"firstName": "Grace", "lastName": "Hopper"}});
        let record = parse_profile("grace", &payload).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Grace Hopper"));
    }

    #[test]
    fn test_parse_unusable_payload_is_unknown_with_snippet() {
        let payload = json!({"paging": {"count": 0}, "elements": []});
        let err = parse_profile("ghost", &payload).unwrap_err();
        assert_eq!(err.kind, FailureKind::Unknown);
        assert!(err.snippet.is_some());
    }

    #[test]
    fn test_current_position_prefers_open_ended_entry() {
        let payload = json!({
            "included": [
                {"$type": PROFILE_TYPE, "firstName": "A", "lastName": "B"},
                {"$type": POSITION_TYPE, "title": "Old Role", "companyName": "Past Co",
                 "endDate": {"year": 2020}},
                {"$type": POSITION_TYPE, "title": "New Role", "companyName": "Now Co"}
            ]
        });
        let record = parse_profile("a-b", &payload).unwrap();
        assert_eq!(record.current_title.as_deref(), Some("New Role"));
        assert_eq!(record.current_organization.as_deref(), Some("Now Co"));
    }

    #[test]
    fn test_current_position_falls_back_to_first_closed_entry() {
        let payload = json!({
            "included": [
                {"$type": PROFILE_TYPE, "firstName": "A", "lastName": "B"},
                {"$type": POSITION_TYPE, "title": "Latest", "companyName": "Recent Co",
                 "endDate": {"year": 2024}},
                {"$type": POSITION_TYPE, "title": "Older", "companyName": "Old Co",
                 "endDate": {"year": 2019}}
            ]
        });
        let record = parse_profile("a-b", &payload).unwrap();
        assert_eq!(record.current_title.as_deref(), Some("Latest"));
    }

    #[test]
    fn test_location_plain_string_fallback() {
        let payload = json!({
            "included": [
                {"$type": PROFILE_TYPE, "firstName": "A", "lastName": "B",
                 "location": {"locationName": "Lisbon, Portugal"}}
            ]
        });
        let record = parse_profile("a-b", &payload).unwrap();
        assert_eq!(record.location.as_deref(), Some("Lisbon, Portugal"));
    }

    #[test]
    fn test_extract_session_cookie() {
        let session =
            extract_session_cookie("bcookie=v2; JSESSIONID=\"ajax:7580\"; lang=en").unwrap();
        assert_eq!(session.csrf_token, "ajax:7580");
        assert_eq!(session.cookie_pair, "JSESSIONID=\"ajax:7580\"");

        let from_set_cookie =
            extract_session_cookie("JSESSIONID=\"ajax:99\"; Path=/; Secure").unwrap();
        assert_eq!(from_set_cookie.csrf_token, "ajax:99");

        assert!(extract_session_cookie("bcookie=v2; lang=en").is_none());
        assert!(extract_session_cookie("JSESSIONID=\"\"").is_none());
    }
}
