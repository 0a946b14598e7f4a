//! Bundle validation.
//!
//! Two passes over all four responses, in order:
//! 1. Existence: success status and no redirect to the provider's error page.
//! 2. Publication date: the 8-digit token in `Content-Disposition` must equal
//!    the requested date. Structure roles are exempt.
//!
//! A bundle is rejected on the first violation; nothing is persisted.

use super::locator::ResourceAddress;
use super::provider::{DataError, RawResponse};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Marker the provider puts in the URL of its generic "not found" page.
pub const DEFAULT_ERROR_PAGE_MARKER: &str = "CustomErrorPage";

fn date_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\D)(\d{8})(?:\D|$)").expect("date token regex is valid"))
}

/// First standalone 8-digit token in a header value.
pub fn publication_date_token(header: &str) -> Option<&str> {
    date_token_regex()
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reject responses that failed or resolved to the provider's error page.
pub fn check_exists(
    address: &ResourceAddress,
    response: &RawResponse,
    error_page_marker: &str,
) -> Result<(), DataError> {
    let not_found = || DataError::NotFound {
        address: address.url.clone(),
        status: response.status,
    };

    if !response.is_success() || response.final_url.contains(error_page_marker) {
        return Err(not_found());
    }

    let is_html = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("text/html"));
    if is_html && String::from_utf8_lossy(&response.body).contains(error_page_marker) {
        return Err(not_found());
    }

    Ok(())
}

/// Require the embedded publication date to match the requested date.
pub fn check_date(
    address: &ResourceAddress,
    response: &RawResponse,
    date: NaiveDate,
) -> Result<(), DataError> {
    if address.resource.is_structure() {
        return Ok(());
    }

    let expected = date.format("%Y%m%d").to_string();
    let found = response
        .content_disposition
        .as_deref()
        .and_then(publication_date_token);

    match found {
        Some(token) if token == expected => Ok(()),
        other => Err(DataError::DateMismatch {
            resource: address.resource,
            expected,
            found: other.map(str::to_string),
        }),
    }
}

/// Validate a complete bundle. `addresses` and `responses` pair up by index.
pub fn validate_bundle(
    date: NaiveDate,
    addresses: &[ResourceAddress],
    responses: &[RawResponse],
    error_page_marker: &str,
) -> Result<(), DataError> {
    if addresses.len() != responses.len() {
        return Err(DataError::Storage(format!(
            "expected {} responses, got {}",
            addresses.len(),
            responses.len()
        )));
    }

    for (address, response) in addresses.iter().zip(responses) {
        check_exists(address, response, error_page_marker)?;
    }
    for (address, response) in addresses.iter().zip(responses) {
        check_date(address, response, date)?;
    }
    Ok(())
}
