use std::fmt;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::{Rate, Response};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("failed to encode query options: {0}")]
    EncodeOptions(#[source] serde_urlencoded::ser::Error),

    #[error("failed to encode request body: {0}")]
    EncodeBody(#[source] serde_json::Error),

    #[error("failed to build request: {0}")]
    BuildRequest(String),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    DateParse(String),

    #[error("invalid time {0:?}: expected H:MM or h:mmam/pm")]
    TimeParse(String),

    #[error("{0}")]
    Api(Box<ErrorResponse>),

    #[error("{0}")]
    RateLimit(Box<RateLimitError>),

    #[error("{0}")]
    AbuseRateLimit(Box<AbuseRateLimitError>),

    #[error("failed to decode response body from {}: {source}", redacted_url(.response))]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Box<Response>,
    },

    /// The status line and headers arrived but the body could not be read.
    /// `source` is the cancellation, deadline or transport failure.
    #[error("failed to read response body from {}: {source}", redacted_url(.response))]
    ReadBody {
        #[source]
        source: Box<Error>,
        response: Box<Response>,
    },

    #[error("failed to copy response body: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps a transport failure, redacting any secret carried in its URL.
    pub fn transport(mut err: reqwest::Error) -> Self {
        if let Some(url) = err.url_mut() {
            *url = sanitize_url(url);
        }
        Error::Transport(err)
    }

    /// The response that produced this error, when the server answered.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api(err) => Some(&err.response),
            Error::RateLimit(err) => Some(&err.response),
            Error::AbuseRateLimit(err) => Some(&err.response),
            Error::Decode { response, .. } => Some(&**response),
            Error::ReadBody { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// The underlying failure, looking through a body read that was cut short.
    pub fn cause(&self) -> &Error {
        match self {
            Error::ReadBody { source, .. } => source.cause(),
            other => other,
        }
    }

    pub(crate) fn read_body(source: Error, response: &Response) -> Self {
        Error::ReadBody {
            source: Box::new(source),
            response: Box::new(response.clone()),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|response| response.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [&self.resource, &self.field, &self.code]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("."))?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Non-2xx answer from the API, other than rate limiting.
#[derive(Debug)]
pub struct ErrorResponse {
    pub response: Response,
    pub message: String,
    pub errors: Vec<FieldError>,
    pub block: Option<Block>,
    pub documentation_url: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_status_line(f, &self.response, &self.message)?;
        if !self.errors.is_empty() {
            let details = self
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            write!(f, " [{}]", details.join(", "))?;
        }
        if let Some(reason) = self.block.as_ref().and_then(|block| block.reason.as_ref()) {
            write!(f, " (blocked: {reason})")?;
        }
        Ok(())
    }
}

/// 429 with the rate-limit quota exhausted.
#[derive(Debug)]
pub struct RateLimitError {
    pub rate: Rate,
    pub response: Response,
    pub message: String,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_status_line(f, &self.response, &self.message)?;
        write!(
            f,
            " [rate limit {} exhausted, {} remaining]",
            self.rate.limit, self.rate.remaining
        )
    }
}

/// 429 without quota headers: the server throttled the caller for abuse.
#[derive(Debug)]
pub struct AbuseRateLimitError {
    pub response: Response,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl fmt::Display for AbuseRateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_status_line(f, &self.response, &self.message)?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " [retry after {}s]", retry_after.as_secs())?;
        }
        Ok(())
    }
}

fn redacted_url(response: &Response) -> Url {
    sanitize_url(&response.url)
}

fn write_status_line(f: &mut fmt::Formatter<'_>, response: &Response, message: &str) -> fmt::Result {
    write!(
        f,
        "{} {}: {} {}",
        response.method,
        redacted_url(response),
        response.status.as_u16(),
        message
    )
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
    #[serde(default)]
    block: Option<Block>,
    #[serde(default)]
    documentation_url: Option<String>,
}

/// Maps a non-2xx response and its body onto the error taxonomy.
pub(crate) fn classify(response: Response, body: &[u8]) -> Error {
    let payload = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
    let message = payload
        .message
        .or(payload.error_description)
        .or(payload.error)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    if response.status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(rate) = response.rate.filter(|rate| rate.remaining == 0) {
            tracing::warn!(limit = rate.limit, "rate limit exhausted");
            return Error::RateLimit(Box::new(RateLimitError {
                rate,
                response,
                message,
            }));
        }
        let retry_after = response.retry_after();
        tracing::warn!(retry_after = ?retry_after, "request throttled");
        return Error::AbuseRateLimit(Box::new(AbuseRateLimitError {
            response,
            message,
            retry_after,
        }));
    }

    Error::Api(Box::new(ErrorResponse {
        response,
        message,
        errors: payload.errors,
        block: payload.block,
        documentation_url: payload.documentation_url,
    }))
}

/// Replaces the value of any `client_secret` query parameter with `REDACTED`.
pub fn sanitize_url(url: &Url) -> Url {
    let mut sanitized = url.clone();
    if !url.query_pairs().any(|(key, _)| key == "client_secret") {
        return sanitized;
    }
    let pairs = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "client_secret" {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect::<Vec<_>>();
    sanitized.query_pairs_mut().clear().extend_pairs(pairs);
    sanitized
}
