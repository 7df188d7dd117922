//! Video identifier extraction.
//!
//! Pure string/URL handling; nothing here touches the network.

use std::fmt;

use url::Url;

/// Canonical YouTube video identifier (e.g. `dQw4w9WgXcQ`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Path prefixes on youtube.com hosts that carry the identifier as the next segment.
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

/// Extract the video identifier from a locator as submitted by a user.
///
/// Recognized shapes:
/// - `https://www.youtube.com/watch?v=ID` (any host, as long as the path is `/watch`)
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/{embed,shorts,live,v}/ID`
///
/// A missing scheme is tolerated (`youtu.be/ID`). Returns `None` for anything else.
pub fn extract_video_id(locator: &str) -> Option<VideoId> {
    let locator = locator.trim();
    if locator.is_empty() {
        return None;
    }

    let url = parse_lenient(locator)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let host = strip_subdomain(&host);

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_owned)
    } else if let Some(v) = query_video_param(&url) {
        let on_youtube = is_youtube_host(host);
        (on_youtube || url.path() == "/watch").then_some(v)
    } else if is_youtube_host(host) {
        let mut segments = url.path_segments()?;
        match segments.next() {
            Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => {
                segments.next().map(str::to_owned)
            }
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| is_valid_id(id)).map(VideoId)
}

fn parse_lenient(locator: &str) -> Option<Url> {
    match Url::parse(locator) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{locator}")).ok()
        }
        Err(_) => None,
    }
}

fn strip_subdomain(host: &str) -> &str {
    ["www.", "m.", "music."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(host)
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host == "youtube-nocookie.com"
}

fn query_video_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(locator: &str) -> Option<String> {
        extract_video_id(locator).map(|v| v.as_str().to_owned())
    }

    #[test]
    fn extracts_from_watch_query() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            id("https://youtube.com/watch?feature=share&v=abc_DEF-123&t=42").as_deref(),
            Some("abc_DEF-123")
        );
        assert_eq!(
            id("https://m.youtube.com/watch?v=XYZ").as_deref(),
            Some("XYZ")
        );
    }

    #[test]
    fn watch_query_is_accepted_on_any_host() {
        assert_eq!(
            id("https://example.com/watch?v=someid").as_deref(),
            Some("someid")
        );
    }

    #[test]
    fn extracts_from_short_links() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            id("https://youtu.be/dQw4w9WgXcQ?si=tracking").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(id("youtu.be/abc").as_deref(), Some("abc"));
    }

    #[test]
    fn extracts_from_path_forms() {
        assert_eq!(id("https://www.youtube.com/embed/abc").as_deref(), Some("abc"));
        assert_eq!(id("https://youtube.com/shorts/abc123").as_deref(), Some("abc123"));
        assert_eq!(id("https://www.youtube.com/live/xyz").as_deref(), Some("xyz"));
        assert_eq!(
            id("https://www.youtube-nocookie.com/embed/abc").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn rejects_unrecognized_locators() {
        for locator in [
            "",
            "   ",
            "not a url",
            "https://example.com/video/123",
            "https://youtu.be/",
            "https://www.youtube.com/",
            "https://www.youtube.com/channel/UC123",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=bad%20id",
            "ftp://youtu.be/abc",
        ] {
            assert!(id(locator).is_none(), "expected no id for {locator:?}");
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let url = "https://www.youtube.com/watch?v=repeatable";
        assert_eq!(extract_video_id(url), extract_video_id(url));
    }
}
