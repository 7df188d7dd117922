//! Normalized failure reporting for transcript lookups.
//!
//! Every way a lookup can go wrong collapses into one of a handful of [`FailureCategory`]
//! values. The HTTP layer maps categories onto status codes; nothing else about the underlying
//! error leaks past the service boundary.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const NO_URL_PROVIDED: &str = "No URL provided";
pub const INVALID_VIDEO_URL: &str = "Invalid YouTube URL";
pub const NO_CAPTIONS_FOUND: &str = "Could not find captions for this video";

/// Coarse classification of a failed transcript lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureCategory {
    /// Missing or unusable request data. Never retried.
    InvalidInput,

    /// An attempt exceeded its time bound.
    Timeout,

    /// The request was valid but no captions exist, even after language fallback.
    NotFound,

    /// Transport-level failure talking to the caption source.
    UpstreamError,

    /// Anything we could not classify.
    Unknown,
}

impl FailureCategory {
    /// Stable, lowercase label (used for metrics and logs).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::UpstreamError => "upstream_error",
            Self::Unknown => "unknown",
        }
    }

    /// Whether another attempt could plausibly change the outcome.
    ///
    /// A missing video or bad input stays missing or bad; transport trouble may clear up.
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::InvalidInput | Self::NotFound)
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized failure with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FailureReport {
    pub category: FailureCategory,
    pub message: String,
}

impl FailureReport {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn no_url() -> Self {
        Self::new(FailureCategory::InvalidInput, NO_URL_PROVIDED)
    }

    pub fn invalid_url() -> Self {
        Self::new(FailureCategory::InvalidInput, INVALID_VIDEO_URL)
    }

    pub fn not_found() -> Self {
        Self::new(FailureCategory::NotFound, NO_CAPTIONS_FOUND)
    }

    pub fn timed_out(after: std::time::Duration) -> Self {
        Self::new(
            FailureCategory::Timeout,
            format!(
                "Request timed out after {}ms while fetching captions",
                after.as_millis()
            ),
        )
    }

    pub fn bad_gateway(detail: impl fmt::Display) -> Self {
        Self::new(
            FailureCategory::UpstreamError,
            format!("Bad Gateway: caption source request failed ({detail})"),
        )
    }
}

/// Heuristic match for transport failures that only surface as text.
///
/// Some errors reach us as plain strings (wrapped library errors, proxies rewriting
/// responses). These are the signatures worth reporting as an upstream failure.
pub fn looks_like_network_failure(message: &str) -> bool {
    const SIGNATURES: &[&str] = &[
        "econnreset",
        "econnrefused",
        "enotfound",
        "etimedout",
        "epipe",
        "connection reset",
        "connection refused",
        "connection closed",
        "broken pipe",
        "dns error",
        "failed to lookup address",
        "network is unreachable",
        "socket hang up",
    ];

    let lower = message.to_ascii_lowercase();
    SIGNATURES.iter().any(|sig| lower.contains(sig))
}
