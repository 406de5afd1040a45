//! Lyric source resolution: inline text versus remote `.lrc` resources.

use crate::lyrics::parse::parse_timeline;
use crate::lyrics::types::{LyricTimeline, LyricsError, http_client};
use reqwest::Url;
use std::path::Path;

/// Where the lyric text for a track comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricSource {
    /// URL or root-relative site path to fetch.
    Remote(String),
    /// The string is the lyric text itself.
    Inline(String),
}

impl LyricSource {
    /// Classify a raw source string. Blank strings are no source at all.
    pub fn classify(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if is_url_like(trimmed) {
            Some(Self::Remote(trimmed.to_string()))
        } else {
            Some(Self::Inline(raw.to_string()))
        }
    }
}

fn is_url_like(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with('/')
}

/// Normalize an asset reference: URLs and root-relative paths pass through,
/// bare relative paths are anchored at the site root.
pub fn resolve_asset_path(path: &str) -> String {
    if path.is_empty() || is_url_like(path) {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Turn a remote source into an absolute URL, joining root-relative paths
/// onto `base_url`.
pub fn absolute_url(source: &str, base_url: Option<&str>) -> Result<Url, LyricsError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Url::parse(source).map_err(|e| LyricsError::Api(format!("invalid lyrics url {source}: {e}")));
    }
    let base = base_url.ok_or_else(|| {
        LyricsError::Api(format!("relative lyrics path {source} needs a base url"))
    })?;
    Url::parse(base)
        .and_then(|b| b.join(source))
        .map_err(|e| LyricsError::Api(format!("cannot resolve {source} against {base}: {e}")))
}

/// Fetch the body of a remote lyric resource.
pub async fn fetch_lyrics(source: &str, base_url: Option<&str>) -> Result<String, LyricsError> {
    let url = absolute_url(source, base_url)?;
    let resp = http_client().get(url).send().await?;
    if !resp.status().is_success() {
        return Err(LyricsError::Api(format!(
            "lyrics fetch: HTTP {}",
            resp.status()
        )));
    }
    Ok(resp.text().await?)
}

/// Read lyric text from a local file.
pub async fn read_lyrics_file(path: &Path) -> Result<String, LyricsError> {
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Resolve the text behind a track's lyrics. Inline text wins when it is not
/// blank; otherwise the source is fetched or taken literally. Failures are
/// logged and reported as "no lyrics".
pub async fn load_lyrics_text(
    inline: Option<&str>,
    source: Option<&str>,
    base_url: Option<&str>,
) -> Option<String> {
    if let Some(text) = inline.filter(|t| !t.trim().is_empty()) {
        return Some(text.to_string());
    }
    match LyricSource::classify(source.unwrap_or_default())? {
        LyricSource::Inline(text) => Some(text),
        LyricSource::Remote(url) => match fetch_lyrics(&url, base_url).await {
            Ok(text) => {
                tracing::debug!(source = %url, bytes = text.len(), "Fetched lyrics");
                Some(text)
            }
            Err(e) => {
                tracing::warn!(source = %url, error = %e, "Failed to load lyrics");
                None
            }
        },
    }
}

/// Load and parse a track's lyrics. Missing or unreachable lyrics give an
/// empty timeline.
pub async fn load_timeline(
    inline: Option<&str>,
    source: Option<&str>,
    base_url: Option<&str>,
) -> LyricTimeline {
    load_lyrics_text(inline, source, base_url)
        .await
        .map(|text| parse_timeline(&text))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_url_like_sources() {
        assert_eq!(
            LyricSource::classify("https://example.com/a.lrc"),
            Some(LyricSource::Remote("https://example.com/a.lrc".into()))
        );
        assert_eq!(
            LyricSource::classify("http://example.com/a.lrc"),
            Some(LyricSource::Remote("http://example.com/a.lrc".into()))
        );
        assert_eq!(
            LyricSource::classify("/music/a.lrc"),
            Some(LyricSource::Remote("/music/a.lrc".into()))
        );
    }

    #[test]
    fn other_strings_are_literal_lyrics() {
        let raw = "[00:01.00]hi";
        assert_eq!(LyricSource::classify(raw), Some(LyricSource::Inline(raw.into())));
        assert_eq!(LyricSource::classify("music/a.lrc"), Some(LyricSource::Inline("music/a.lrc".into())));
        assert_eq!(LyricSource::classify("   "), None);
    }

    #[test]
    fn asset_paths_get_rooted() {
        assert_eq!(resolve_asset_path("covers/a.jpg"), "/covers/a.jpg");
        assert_eq!(resolve_asset_path("/covers/a.jpg"), "/covers/a.jpg");
        assert_eq!(resolve_asset_path("https://cdn.example/a.jpg"), "https://cdn.example/a.jpg");
        assert_eq!(resolve_asset_path(""), "");
    }

    #[test]
    fn joins_root_relative_paths_onto_base() {
        let url = absolute_url("/lrc/song.lrc", Some("https://blog.example/posts/x")).unwrap();
        assert_eq!(url.as_str(), "https://blog.example/lrc/song.lrc");
        assert!(absolute_url("/lrc/song.lrc", None).is_err());
    }

    #[tokio::test]
    async fn inline_text_takes_precedence() {
        let tl = load_timeline(Some("[00:01.00]inline"), Some("https://unused.invalid/x.lrc"), None).await;
        assert_eq!(tl.lines()[0].text, "inline");
    }

    #[tokio::test]
    async fn literal_source_is_parsed() {
        let tl = load_timeline(Some("  "), Some("[00:02.00]literal"), None).await;
        assert_eq!(tl.len(), 1);
        assert_eq!(tl.lines()[0].time, 2.0);
    }

    #[tokio::test]
    async fn unresolvable_source_gives_empty_timeline() {
        let tl = load_timeline(None, Some("/lyrics/missing.lrc"), None).await;
        assert!(tl.is_empty());
        assert!(load_timeline(None, None, None).await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = read_lyrics_file(Path::new("/definitely/not/here.lrc")).await.unwrap_err();
        assert!(matches!(err, LyricsError::Io(_)));
    }
}
