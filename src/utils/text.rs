//! Text cleanup for scraped page content.

/// Collapse runs of whitespace to single spaces and trim.
///
/// Returns `None` when nothing printable remains, so callers can feed
/// raw selector output straight into optional record fields.
pub fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Strip trailing employment qualifiers from an organization name
/// ("Acme Corp · Full-time" -> "Acme Corp").
pub fn strip_org_qualifier(name: &str) -> String {
    name.split('·').next().unwrap_or(name).trim().to_string()
}
