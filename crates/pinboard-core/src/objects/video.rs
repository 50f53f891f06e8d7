//! Embedded video payload.

use crate::ingest::{IngestError, IngestResult};
use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Source URL of an embedded video player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPayload {
    url: String,
}

impl VideoPayload {
    /// Validate user input. Only absolute http(s) URLs are accepted.
    pub fn parse(input: &str) -> IngestResult<Self> {
        let trimmed = input.trim();
        let parsed = Url::parse(trimmed).map_err(|e| IngestError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self {
                url: trimmed.to_string(),
            }),
            other => Err(IngestError::InvalidUrl(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Rebuild from a persisted snapshot without re-validating.
    pub(crate) fn from_stored(url: String) -> Self {
        Self { url }
    }

    /// The URL as entered.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The YouTube video id, if the URL names one.
    pub fn video_id(&self) -> Option<String> {
        let parsed = Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;

        if host.ends_with("youtu.be") {
            return parsed
                .path_segments()
                .and_then(|mut segments| segments.next())
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }

        if host.ends_with("youtube.com") {
            if let Some(id) = parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
            {
                return Some(id);
            }
            let mut segments = parsed.path_segments()?;
            if segments.next() == Some("embed") {
                return segments.next().filter(|id| !id.is_empty()).map(str::to_string);
            }
        }

        None
    }

    /// URL suitable for an embedded player frame.
    pub fn embed_url(&self) -> String {
        match self.video_id() {
            Some(id) => format!("{}{}", EMBED_BASE, id),
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url_embed() {
        let video = VideoPayload::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap();
        assert_eq!(video.video_id().as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
    }

    #[test]
    fn test_short_url_embed() {
        let video = VideoPayload::parse("https://youtu.be/abc123").unwrap();
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/abc123");
    }

    #[test]
    fn test_other_url_passes_through() {
        let video = VideoPayload::parse("https://example.com/clip.mp4").unwrap();
        assert_eq!(video.video_id(), None);
        assert_eq!(video.embed_url(), "https://example.com/clip.mp4");
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(VideoPayload::parse("not a url"), Err(IngestError::InvalidUrl(_))));
        assert!(matches!(VideoPayload::parse("ftp://example.com/x"), Err(IngestError::InvalidUrl(_))));
        assert!(VideoPayload::parse("").is_err());
    }
}
