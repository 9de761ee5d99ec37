//! The canonical normalized profile shape.

use serde::{Deserialize, Serialize};

/// Normalized result of one profile acquisition.
///
/// Every field except `target_identifier` is independently optional: a
/// record carrying only a name is still usable downstream, with degraded
/// message quality signaled via [`ProfileRecord::is_limited`]. Records are
/// built once by a strategy and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Slug extracted from the profile URL, unique per profile.
    pub target_identifier: String,
    pub full_name: Option<String>,
    /// Short self-description line under the name.
    pub headline: Option<String>,
    /// Most recent job title.
    pub current_title: Option<String>,
    /// Most recent employer, cleaned of trailing qualifiers.
    pub current_organization: Option<String>,
    pub location: Option<String>,
    /// Long-form "about" text.
    pub summary: Option<String>,
}

impl ProfileRecord {
    pub fn new(target_identifier: impl Into<String>) -> Self {
        Self {
            target_identifier: target_identifier.into(),
            ..Default::default()
        }
    }

    /// A record is limited when the title or the organization is missing,
    /// which caps the quality of any generated outreach message.
    pub fn is_limited(&self) -> bool {
        !has_value(&self.current_title) || !has_value(&self.current_organization)
    }

    /// First token of the full name, for message salutations.
    pub fn first_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: Option<&str>, org: Option<&str>) -> ProfileRecord {
        ProfileRecord {
            current_title: title.map(String::from),
            current_organization: org.map(String::from),
            ..ProfileRecord::new("jane-doe")
        }
    }

    #[test]
    fn test_limited_flag_truth_table() {
        assert!(!record(Some("Engineer"), Some("Acme")).is_limited());
        assert!(record(Some("Engineer"), None).is_limited());
        assert!(record(None, Some("Acme")).is_limited());
        assert!(record(None, None).is_limited());
    }

    #[test]
    fn test_limited_treats_blank_as_missing() {
        assert!(record(Some("  "), Some("Acme")).is_limited());
        assert!(record(Some("Engineer"), Some("")).is_limited());
    }

    #[test]
    fn test_first_name() {
        let mut r = ProfileRecord::new("jane-doe");
        r.full_name = Some("Jane Q. Doe".to_string());
        assert_eq!(r.first_name(), Some("Jane"));
        r.full_name = None;
        assert_eq!(r.first_name(), None);
    }
}
