//! Field extraction from a rendered profile page.
//!
//! Runs over the final HTML snapshot, so it stays testable without a
//! browser. Selector paths are coupled to the page structure of the
//! source and will drift with it.

use scraper::{Html, Selector};

use crate::models::ProfileRecord;
use crate::utils::text::{clean_text, strip_org_qualifier};

use super::super::error::{AcquisitionError, FailureKind};

const NAME: &str = "h1";
const HEADLINE: &str = "div.text-body-medium.break-words";
const LOCATION: &str = "span.text-body-small.inline.t-black--light.break-words";
const SUMMARY: &str = r#"div[data-generated-suggestion-target] span[aria-hidden="true"]"#;
const EXPERIENCE_TITLE: &str =
    r#".display-flex.align-items-center.mr1.hoverable-link-text.t-bold span[aria-hidden="true"]"#;
const EXPERIENCE_ORG: &str = r#"a.optional-action-target-wrapper.display-flex.flex-column.full-width span.t-14.t-normal > span[aria-hidden="true"]"#;

/// Extract a profile record from rendered page HTML.
///
/// Individual fields are independently optional; only a page yielding no
/// fields at all is an extraction failure (the chain should try another
/// transport rather than return an empty record).
pub fn extract_profile(slug: &str, html: &str) -> Result<ProfileRecord, AcquisitionError> {
    let document = Html::parse_document(html);

    let mut record = ProfileRecord::new(slug);
    record.full_name = select_text(&document, NAME);
    record.headline = select_text(&document, HEADLINE);
    record.location = select_text(&document, LOCATION);
    record.summary = select_text(&document, SUMMARY);
    record.current_title = select_text(&document, EXPERIENCE_TITLE);
    record.current_organization =
        select_text(&document, EXPERIENCE_ORG).map(|org| strip_org_qualifier(&org));

    if is_blank(&record) {
        return Err(AcquisitionError::new(
            FailureKind::Unknown,
            format!("no profile fields extracted from page for {slug}"),
        ));
    }
    Ok(record)
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).expect("valid profile selector");
    let element = document.select(&selector).next()?;
    clean_text(&element.text().collect::<String>())
}

fn is_blank(record: &ProfileRecord) -> bool {
    record.full_name.is_none()
        && record.headline.is_none()
        && record.location.is_none()
        && record.summary.is_none()
        && record.current_title.is_none()
        && record.current_organization.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_PAGE: &str = r#"
        <html><body>
          <h1>  Jane
            Doe </h1>
          <div class="text-body-medium break-words">Staff Engineer at Acme</div>
          <span class="text-body-small inline t-black--light break-words">Berlin, Germany</span>
          <div data-generated-suggestion-target="x">
            <span aria-hidden="true">Building reliable systems for a decade.</span>
          </div>
          <div class="display-flex align-items-center mr1 hoverable-link-text t-bold">
            <span aria-hidden="true">Staff Engineer</span>
          </div>
          <a class="optional-action-target-wrapper display-flex flex-column full-width">
            <span class="t-14 t-normal"><span aria-hidden="true">Acme Corp · Full-time</span></span>
          </a>
        </body></html>
    "#;

    #[test]
    fn test_extract_full_profile() {
        let record = extract_profile("jane-doe", PROFILE_PAGE).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.headline.as_deref(), Some("Staff Engineer at Acme"));
        assert_eq!(record.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(
            record.summary.as_deref(),
            Some("Building reliable systems for a decade.")
        );
        assert_eq!(record.current_title.as_deref(), Some("Staff Engineer"));
        assert_eq!(record.current_organization.as_deref(), Some("Acme Corp"));
        assert!(!record.is_limited());
    }

    #[test]
    fn test_extract_partial_profile_is_success() {
        let html = "<html><body><h1>Jane Doe</h1></body></html>";
        let record = extract_profile("jane-doe", html).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
        assert!(record.current_title.is_none());
        assert!(record.is_limited());
    }

    #[test]
    fn test_extract_empty_page_fails() {
        let err = extract_profile("jane-doe", "<html><body></body></html>").unwrap_err();
        assert_eq!(err.kind, FailureKind::Unknown);
    }
}
