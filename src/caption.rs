use std::future::Future;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::failure::{FailureCategory, FailureReport, looks_like_network_failure};
use crate::video_id::VideoId;

/// One caption line as displayed by the source, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionFragment {
    pub text: String,

    /// Start of the cue in seconds, when the source provides timing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<f32>,

    /// Length of the cue in seconds, when the source provides timing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f32>,
}

impl CaptionFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_seconds: None,
            duration_seconds: None,
        }
    }

    pub fn with_timing(mut self, start_seconds: f32, duration_seconds: f32) -> Self {
        self.start_seconds = Some(start_seconds);
        self.duration_seconds = Some(duration_seconds);
        self
    }
}

/// Failure modes a caption source can report for a single fetch.
#[derive(Debug, Error)]
pub enum CaptionSourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("caption source timed out")]
    Timeout,

    #[error("video is unavailable: {0}")]
    Unavailable(String),

    #[error("caption source is rate limiting requests")]
    RateLimited,

    #[error("unexpected response from caption source: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}

impl CaptionSourceError {
    /// Classify this error into the service-level taxonomy.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Network(_) | Self::RateLimited => FailureCategory::UpstreamError,
            Self::Timeout => FailureCategory::Timeout,
            Self::Unavailable(_) => FailureCategory::NotFound,
            Self::Malformed(_) => FailureCategory::Unknown,
            Self::Other(msg) if looks_like_network_failure(msg) => {
                FailureCategory::UpstreamError
            }
            Self::Other(_) => FailureCategory::Unknown,
        }
    }
}

impl From<CaptionSourceError> for FailureReport {
    fn from(err: CaptionSourceError) -> Self {
        match err.category() {
            FailureCategory::UpstreamError => FailureReport::bad_gateway(&err),
            FailureCategory::NotFound => FailureReport::not_found(),
            category => FailureReport::new(category, err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CaptionSourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_connect() || err.is_request() {
            return Self::Network(format!("{err:#}"));
        }
        if let Some(status) = err.status() {
            if status.is_server_error() {
                return Self::Network(format!("upstream responded with {status}"));
            }
            match status {
                StatusCode::TOO_MANY_REQUESTS => return Self::RateLimited,
                StatusCode::NOT_FOUND | StatusCode::GONE => {
                    return Self::Unavailable(format!("upstream responded with {status}"));
                }
                _ => {}
            }
            return Self::Other(format!("upstream responded with {status}"));
        }
        if err.is_decode() || err.is_body() {
            return Self::Malformed(format!("{err:#}"));
        }
        Self::Other(format!("{err:#}"))
    }
}

/// Anything that can turn a (video, language) pair into caption fragments.
///
/// An empty `Ok` means "no captions in this language", which is distinct from a failure: the
/// transcript service falls back to another language on empty results but retries on errors.
///
/// Implementations don't need to enforce their own deadline; the caller bounds every fetch and
/// drops the future when the bound elapses.
pub trait CaptionSource {
    fn fetch(
        &self,
        video_id: &VideoId,
        language: &str,
    ) -> impl Future<Output = Result<Vec<CaptionFragment>, CaptionSourceError>> + Send;
}
