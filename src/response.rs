use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode, Url};

const LIMIT_HEADER: &str = "X-RateLimit-Limit";
const REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Last rate-limit figures reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub limit: i64,
    pub remaining: i64,
}

impl Rate {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_i64(headers, REMAINING_HEADER)?;
        let limit = header_i64(headers, LIMIT_HEADER).unwrap_or_default();
        Some(Self { limit, remaining })
    }
}

/// Snapshot of an HTTP response kept after its body has been consumed.
///
/// Returned next to every decoded value and carried inside the API and
/// rate-limit errors so callers can inspect status and headers on failure.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub rate: Option<Rate>,
}

impl Response {
    pub(crate) fn capture(method: Method, response: &reqwest::Response) -> Self {
        let headers = response.headers().clone();
        Self {
            method,
            url: response.url().clone(),
            status: response.status(),
            rate: Rate::from_headers(&headers),
            headers,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// `Retry-After` interpreted as a whole number of seconds.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header(RETRY_AFTER.as_str())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
