//! Prompt construction and the deterministic fallback message.

use crate::models::ProfileRecord;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates personalized outreach messages.";

/// Build the generation prompt from whatever profile fields are present.
pub fn build_prompt(record: &ProfileRecord) -> String {
    format!(
        "Generate a personalized outreach message based on the following profile information:\n\
         \n\
         Name: {}\n\
         Job Title: {}\n\
         Company: {}\n\
         Location: {}\n\
         Summary: {}\n\
         \n\
         The message should:\n\
         1. Be friendly and professional\n\
         2. Mention their job title and company\n\
         3. Briefly explain how our campaign management system can help them with their outreach and increase meetings & sales\n\
         4. End with a clear call to action\n\
         5. Be under 200 characters",
        field(&record.full_name),
        field(&record.current_title),
        field(&record.current_organization),
        field(&record.location),
        field(&record.summary),
    )
}

/// Deterministic fallback when the remote call is unavailable or fails.
/// Built only from the name's first token, title, and organization.
pub fn fallback_message(record: &ProfileRecord) -> String {
    let first_name = record.first_name().unwrap_or("there");
    let title = record.current_title.as_deref().unwrap_or("a professional");
    let organization = record
        .current_organization
        .as_deref()
        .unwrap_or("your company");
    format!(
        "Hey {first_name}, I see you're working as a {title} at {organization}. \
         Our tool can help automate your outreach and increase meetings & sales. Let's connect!"
    )
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unknown")
}
