use std::{io, result};

use crate::retry::RetryableError;
use thiserror::Error;

/// Failure of the search/fetch collaborator.
///
/// Callers treat every variant as the single "fetch failed" category; the
/// variants exist for logging and for the retry layer.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// ESearch JSON could not be decoded
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// EFetch XML could not be decoded
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Non-success HTTP status, or an error reported inside a 200 body
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Local rate limiter could not hand out a token
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// ESearch cannot page past this many results
    #[error("Search limit exceeded: requested {requested}, maximum is {maximum}")]
    SearchLimitExceeded { requested: usize, maximum: usize },
}

pub type Result<T> = result::Result<T, FetchError>;

/// Failure while writing a filtered batch to its sink.
///
/// Rows written before the failure stay written.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RetryableError for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            FetchError::RateLimitExceeded => true,

            FetchError::ApiError { status, message } => {
                (500..600).contains(status) || *status == 429 || {
                    let lower_msg = message.to_lowercase();
                    lower_msg.contains("temporarily unavailable")
                        || lower_msg.contains("timeout")
                        || lower_msg.contains("connection")
                }
            }

            FetchError::JsonError(_)
            | FetchError::XmlError(_)
            | FetchError::SearchLimitExceeded { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            FetchError::RequestError(err) if err.is_timeout() => "Request timeout",
            FetchError::RequestError(err) if err.is_connect() => "Connection error",
            FetchError::RequestError(_) => "Network error",
            FetchError::RateLimitExceeded => "Rate limit exceeded",
            FetchError::ApiError { status, .. } => match status {
                429 => "Rate limit exceeded",
                500..=599 => "Server error",
                _ => "API error",
            },
            FetchError::JsonError(_) => "Invalid JSON response",
            FetchError::XmlError(_) => "Invalid XML response",
            FetchError::SearchLimitExceeded { .. } => "Invalid request",
        }
    }
}
