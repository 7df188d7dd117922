//! Caption source backed by YouTube's public watch page and timed-text endpoint.
//!
//! A fetch is two requests:
//! 1. `GET /watch?v=ID`, from which we pull the embedded `"captions":` JSON and its track list.
//! 2. `GET <track baseUrl>`, which returns timed-text XML (`<text start dur>..</text>` cues).
//!
//! A missing track for the requested language is reported as an empty result, not an error,
//! so the transcript service can apply its language fallback.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::caption::{CaptionFragment, CaptionSource, CaptionSourceError};
use crate::video_id::VideoId;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const RECAPTCHA_MARKER: &str = r#"class="g-recaptcha""#;
const CAPTIONS_MARKER: &str = r#""captions":"#;
const PLAYABILITY_MARKER: &str = r#""playabilityStatus":"#;

static TEXT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<text start="([^"]*)" dur="([^"]*)"[^>]*>([^<]*)</text>"#)
        .expect("timed-text pattern must be valid")
});

/// One entry of `playerCaptionsTracklistRenderer.captionTracks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,

    /// `"asr"` for auto-generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsSection {
    #[serde(default)]
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone)]
pub struct YouTubeCaptionSource {
    client: Client,
    base_url: String,
}

impl YouTubeCaptionSource {
    /// Build a source with its own connection-pooled HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(BROWSER_USER_AGENT).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Point the watch-page requests somewhere else (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(
        &self,
        url: &str,
        language: &str,
    ) -> std::result::Result<String, CaptionSourceError> {
        let text = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, language)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

impl CaptionSource for YouTubeCaptionSource {
    async fn fetch(
        &self,
        video_id: &VideoId,
        language: &str,
    ) -> std::result::Result<Vec<CaptionFragment>, CaptionSourceError> {
        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let page = self.get_text(&watch_url, language).await?;

        let Some(tracks) = parse_caption_tracks(&page, video_id)? else {
            debug!(%video_id, "video has no caption tracks");
            return Ok(Vec::new());
        };

        let Some(track) = select_track(&tracks, language) else {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            debug!(%video_id, language, ?available, "no caption track for language");
            return Ok(Vec::new());
        };

        let xml = self.get_text(&track.base_url, language).await?;
        Ok(parse_timed_text(&xml))
    }
}

/// Pull the caption track list out of a watch page.
///
/// `Ok(None)` means the video is playable but has captions disabled.
pub fn parse_caption_tracks(
    page: &str,
    video_id: &VideoId,
) -> std::result::Result<Option<Vec<CaptionTrack>>, CaptionSourceError> {
    if page.contains(RECAPTCHA_MARKER) {
        return Err(CaptionSourceError::RateLimited);
    }

    let Some((_, after)) = page.split_once(CAPTIONS_MARKER) else {
        if !page.contains(PLAYABILITY_MARKER) {
            return Err(CaptionSourceError::Unavailable(video_id.to_string()));
        }
        return Ok(None);
    };

    // The section is followed by the rest of the player response; only the first value matters.
    let section = match serde_json::Deserializer::from_str(after)
        .into_iter::<CaptionsSection>()
        .next()
    {
        Some(Ok(section)) => section,
        Some(Err(err)) => {
            return Err(CaptionSourceError::Malformed(format!(
                "captions section is not valid JSON: {err}"
            )));
        }
        None => {
            return Err(CaptionSourceError::Malformed(
                "captions section is empty".to_owned(),
            ));
        }
    };

    let tracks = section
        .player_captions_tracklist_renderer
        .map(|renderer| renderer.caption_tracks)
        .unwrap_or_default();

    Ok((!tracks.is_empty()).then_some(tracks))
}

/// Pick the track for `language`: exact code first, then a matching primary subtag
/// (`en` ↔ `en-GB`).
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let wanted = primary_subtag(language);

    tracks
        .iter()
        .find(|track| track.language_code.eq_ignore_ascii_case(language))
        .or_else(|| {
            tracks
                .iter()
                .find(|track| primary_subtag(&track.language_code).eq_ignore_ascii_case(wanted))
        })
}

fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Decode timed-text XML into fragments, in document order.
pub fn parse_timed_text(xml: &str) -> Vec<CaptionFragment> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .map(|caps| CaptionFragment {
            text: decode_entities(&caps[3]),
            start_seconds: caps[1].parse().ok(),
            duration_seconds: caps[2].parse().ok(),
        })
        .collect()
}

/// Decode the HTML entities YouTube leaves in caption text.
///
/// Cue text arrives escaped twice (XML around HTML, e.g. `&amp;#39;`), so a second pass runs
/// when the first one leaves an ampersand behind. There are never more than two passes: a
/// literal `&lt;` in the caption is sent as `&amp;amp;lt;` and survives as `&lt;`.
pub fn decode_entities(input: &str) -> String {
    let once = decode_entities_once(input);
    if once.contains('&') {
        decode_entities_once(&once)
    } else {
        once
    }
}

fn decode_entities_once(input: &str) -> String {
    const MAX_ENTITY_LEN: usize = 10;

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
