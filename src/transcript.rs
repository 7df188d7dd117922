//! Transcript acquisition: the request-scoped workflow behind every lookup.
//!
//! The flow for one request is strictly sequential:
//! locator → video id → primary fetch (timeout per attempt, bounded retries) →
//! optional single fallback fetch → join.
//!
//! Nothing here holds state between requests. A per-attempt timeout drops the in-flight fetch
//! future; whatever it would have produced is never observed.

use tokio::time::{sleep, timeout};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::caption::{CaptionFragment, CaptionSource, CaptionSourceError};
use crate::failure::{FailureCategory, FailureReport};
use crate::opts::{DEFAULT_LANGUAGE, Opts};
use crate::video_id::{VideoId, extract_video_id};

/// A single transcript lookup as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    /// Raw URL as submitted.
    pub video_locator: String,

    /// Preferred caption language. Best effort; see [`Opts::fallback_language`].
    pub language: String,
}

impl TranscriptRequest {
    /// Build a request, defaulting a missing or blank language to `"en"`.
    pub fn new(video_locator: impl Into<String>, language: Option<&str>) -> Self {
        let language = language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);

        Self {
            video_locator: video_locator.into(),
            language: language.to_owned(),
        }
    }

    pub async fn fetch<S: CaptionSource>(
        &self,
        source: &S,
        opts: &Opts,
    ) -> Result<TranscriptResult, FailureReport> {
        fetch_transcript(source, opts, &self.video_locator, &self.language).await
    }
}

/// A successfully assembled transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub video_id: VideoId,

    /// Language that actually produced the captions (differs from the request after fallback).
    pub language: String,

    pub fragments: Vec<CaptionFragment>,

    /// Fragment texts joined by single spaces, in source order.
    pub full_text: String,
}

/// Join fragment texts with a single ASCII space, preserving order and content.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fetch and assemble the transcript for `video_locator`.
///
/// Failures are always returned as a categorized [`FailureReport`]:
/// - blank locator or unresolvable URL → `InvalidInput`, without touching the source
/// - every attempt timed out → `Timeout`
/// - no captions in the requested language nor the fallback → `NotFound`
/// - transport problems → `UpstreamError`
pub async fn fetch_transcript<S: CaptionSource>(
    source: &S,
    opts: &Opts,
    video_locator: &str,
    language: &str,
) -> Result<TranscriptResult, FailureReport> {
    let span = info_span!("fetch_transcript", request_id = %Uuid::new_v4());
    fetch_transcript_inner(source, opts, video_locator, language)
        .instrument(span)
        .await
}

async fn fetch_transcript_inner<S: CaptionSource>(
    source: &S,
    opts: &Opts,
    video_locator: &str,
    language: &str,
) -> Result<TranscriptResult, FailureReport> {
    let locator = video_locator.trim();
    if locator.is_empty() {
        return Err(FailureReport::no_url());
    }

    let Some(video_id) = extract_video_id(locator) else {
        debug!(locator, "could not resolve a video id");
        return Err(FailureReport::invalid_url());
    };

    let language = match language.trim() {
        "" => DEFAULT_LANGUAGE,
        lang => lang,
    };

    let mut fragments = fetch_with_retry(source, opts, &video_id, language).await?;
    let mut used_language = language;

    if fragments.is_empty() && !language.eq_ignore_ascii_case(&opts.fallback_language) {
        info!(
            %video_id,
            requested = language,
            fallback = %opts.fallback_language,
            "no captions in requested language, trying fallback"
        );
        fragments = fetch_once(source, opts, &video_id, &opts.fallback_language).await?;
        used_language = opts.fallback_language.as_str();
    }

    if fragments.is_empty() {
        info!(%video_id, "no captions available");
        return Err(FailureReport::not_found());
    }

    let full_text = join_fragments(&fragments);
    info!(
        %video_id,
        language = used_language,
        fragments = fragments.len(),
        "transcript assembled"
    );

    Ok(TranscriptResult {
        video_id,
        language: used_language.to_owned(),
        fragments,
        full_text,
    })
}

/// Run up to `opts.max_attempts` bounded fetches, pausing between failures.
///
/// Returns on the first success (including an empty one). Failures whose category is not
/// retryable are surfaced at once; otherwise the last failure is surfaced.
async fn fetch_with_retry<S: CaptionSource>(
    source: &S,
    opts: &Opts,
    video_id: &VideoId,
    language: &str,
) -> Result<Vec<CaptionFragment>, FailureReport> {
    let max_attempts = opts.attempts();
    let mut attempt = 1;

    loop {
        let report = match fetch_once(source, opts, video_id, language).await {
            Ok(fragments) => return Ok(fragments),
            Err(report) => report,
        };

        if !report.category.is_retryable() {
            debug!(
                %video_id,
                attempt,
                category = %report.category,
                "caption fetch failed permanently, not retrying"
            );
            return Err(report);
        }

        if attempt >= max_attempts {
            warn!(
                %video_id,
                attempt,
                max_attempts,
                category = %report.category,
                error = %report.message,
                "caption fetch failed, giving up"
            );
            return Err(report);
        }

        let delay = opts.delay_after(attempt);
        warn!(
            %video_id,
            attempt,
            max_attempts,
            category = %report.category,
            error = %report.message,
            delay_ms = delay.as_millis() as u64,
            "caption fetch failed, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

/// One fetch raced against `opts.attempt_timeout`.
async fn fetch_once<S: CaptionSource>(
    source: &S,
    opts: &Opts,
    video_id: &VideoId,
    language: &str,
) -> Result<Vec<CaptionFragment>, FailureReport> {
    match timeout(opts.attempt_timeout, source.fetch(video_id, language)).await {
        Ok(Ok(fragments)) => Ok(fragments),
        Ok(Err(err)) => Err(categorize(video_id, language, err)),
        Err(_) => Err(FailureReport::timed_out(opts.attempt_timeout)),
    }
}

fn categorize(video_id: &VideoId, language: &str, err: CaptionSourceError) -> FailureReport {
    if err.category() == FailureCategory::Unknown {
        error!(%video_id, language, error = ?err, "uncategorized caption source failure");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_preserves_order_and_whitespace() {
        let fragments = vec![
            CaptionFragment::new("a"),
            CaptionFragment::new(" b "),
            CaptionFragment::new("c"),
        ];
        assert_eq!(join_fragments(&fragments), "a  b  c");
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert_eq!(join_fragments(&[]), "");
    }

    #[test]
    fn request_defaults_language() {
        assert_eq!(TranscriptRequest::new("u", None).language, "en");
        assert_eq!(TranscriptRequest::new("u", Some("  ")).language, "en");
        assert_eq!(TranscriptRequest::new("u", Some("fr")).language, "fr");
    }
}
