//! HTTP transport for the provider's historical-data endpoint.
//!
//! Blocking client, one request at a time. Redirects are followed so that the
//! provider's error-page redirect shows up in `RawResponse::final_url`.
//! Retrying is the scheduler's job; this layer never retries.

use super::locator::ResourceAddress;
use super::provider::{DataError, RawResponse, ResourceFetcher};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("tickfetch/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP transport.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn transport_error(address: &ResourceAddress, err: reqwest::Error) -> DataError {
        let reason = if err.is_timeout() {
            format!("timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        DataError::Transport {
            address: address.url.clone(),
            reason,
        }
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl ResourceFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, address: &ResourceAddress) -> Result<RawResponse, DataError> {
        tracing::debug!(url = %address.url, resource = %address.resource, "GET");

        let resp = self
            .client
            .get(&address.url)
            .send()
            .map_err(|e| Self::transport_error(address, e))?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let content_disposition = header_value(resp.headers(), CONTENT_DISPOSITION);
        let content_type = header_value(resp.headers(), CONTENT_TYPE);

        // A timeout while streaming the body is still a transport fault.
        let body = resp
            .bytes()
            .map_err(|e| Self::transport_error(address, e))?
            .to_vec();

        tracing::debug!(
            url = %address.url,
            status,
            final_url = %final_url,
            bytes = body.len(),
            "response received"
        );

        Ok(RawResponse {
            status,
            final_url,
            content_disposition,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client() {
        let fetcher = HttpFetcher::new(Duration::from_secs(10), DEFAULT_USER_AGENT).unwrap();
        assert_eq!(fetcher.name(), "http");
    }

    #[test]
    fn header_lookup_ignores_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            "attachment; filename=TC_20250109.txt".parse().unwrap(),
        );
        assert_eq!(
            header_value(&headers, CONTENT_DISPOSITION).as_deref(),
            Some("attachment; filename=TC_20250109.txt")
        );
        assert_eq!(header_value(&headers, CONTENT_TYPE), None);
    }
}
