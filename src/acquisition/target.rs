//! Profile URL validation and identifier extraction.

use std::sync::OnceLock;

use regex::Regex;

use super::error::AcquisitionError;

/// A validated acquisition target: the original URL plus the slug that
/// uniquely identifies the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTarget {
    pub url: String,
    pub slug: String,
}

fn profile_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://(?:www\.)?linkedin\.com/in/([^/?#]+)").expect("valid profile pattern")
    })
}

impl ProfileTarget {
    /// Parse and validate a profile URL.
    ///
    /// The slug is a pure function of the URL string: stable under
    /// trailing slashes, query strings, and fragments. Anything without
    /// an `/in/<slug>` segment is rejected before any network activity.
    pub fn parse(url: &str) -> Result<Self, AcquisitionError> {
        let url = url.trim();
        let captures = profile_url_pattern()
            .captures(url)
            .ok_or_else(|| AcquisitionError::invalid_input(format!("invalid profile URL: {url}")))?;
        let slug = captures[1].to_string();
        if slug.is_empty() {
            return Err(AcquisitionError::invalid_input(format!(
                "invalid profile URL: {url}"
            )));
        }
        Ok(Self {
            url: url.to_string(),
            slug,
        })
    }
}
