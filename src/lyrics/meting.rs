//! Meting API client: track metadata (title, artist, cover, audio and lyric
//! source) for a music card.

use crate::lyrics::source::resolve_asset_path;
use crate::lyrics::types::{LyricsError, http_client};
use serde::Serialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Durations above this are reported in milliseconds by some Meting servers.
const MILLIS_DURATION_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover: String,
    pub url: String,
    /// Lyric source: a URL, a site path or the LRC text itself.
    pub lrc: String,
    /// Seconds; 0 when unknown.
    pub duration: f64,
}

impl Track {
    /// Map one Meting song object. `index` seeds the id when the server
    /// omits one.
    pub fn from_meting(song: &Value, index: usize) -> Self {
        let title = first_string(song, &["name", "title"]).unwrap_or_else(|| UNKNOWN_TRACK.to_string());
        let artist = first_string(song, &["artist", "author"]).unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let id = match song.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("meting-{index}"),
        };
        Self {
            id,
            title,
            artist,
            cover: resolve_asset_path(&string_field(song, "pic")),
            url: string_field(song, "url"),
            lrc: string_field(song, "lrc"),
            duration: normalize_duration(song.get("duration").and_then(Value::as_f64)),
        }
    }
}

fn string_field(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

// Artist fields are either a string or a list of names.
fn first_string(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match v.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let names: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!names.is_empty()).then(|| names.join(" / "))
        }
        _ => None,
    })
}

pub fn normalize_duration(raw: Option<f64>) -> f64 {
    let mut dur = raw.unwrap_or(0.0);
    if dur > MILLIS_DURATION_THRESHOLD {
        dur = (dur / 1000.0).floor();
    }
    if !dur.is_finite() || dur <= 0.0 {
        return 0.0;
    }
    dur
}

/// Build a Meting playlist request URL. `nonce` busts intermediate caches.
pub fn build_playlist_url(api: &str, server: &str, kind: &str, id: &str, nonce: &str) -> String {
    let separator = if api.contains('?') { '&' } else { '?' };
    let params = [("server", server), ("type", kind), ("id", id), ("r", nonce)];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{api}{separator}{query}")
}

fn cache_nonce() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos().to_string())
        .unwrap_or_default()
}

async fn get_json(url: &str) -> Result<Value, LyricsError> {
    let resp = http_client().get(url).send().await?;
    if !resp.status().is_success() {
        return Err(LyricsError::Api(format!("meting: HTTP {}", resp.status())));
    }
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Parse a playlist response body.
pub fn parse_playlist(body: &Value) -> Result<Vec<Track>, LyricsError> {
    let songs = body
        .as_array()
        .ok_or_else(|| LyricsError::Api("meting: playlist is not an array".to_string()))?;
    Ok(songs.iter().enumerate().map(|(i, s)| Track::from_meting(s, i)).collect())
}

/// Fetch a whole playlist from a Meting API endpoint.
pub async fn fetch_meting_playlist(
    api: &str,
    server: &str,
    kind: &str,
    id: &str,
) -> Result<Vec<Track>, LyricsError> {
    if api.is_empty() || id.is_empty() {
        return Ok(Vec::new());
    }
    let url = build_playlist_url(api, server, kind, id, &cache_nonce());
    let body = get_json(&url).await?;
    let tracks = parse_playlist(&body)?;
    tracing::debug!(server, id, tracks = tracks.len(), "Fetched Meting playlist");
    Ok(tracks)
}

/// Pick the card's track from a single-track response: the first element of
/// an array, or the object itself.
pub fn parse_single(body: &Value) -> Option<Track> {
    let song = match body {
        Value::Array(items) => items.first()?,
        Value::Object(_) => body,
        _ => return None,
    };
    Some(Track::from_meting(song, 0))
}

/// Fetch the metadata for a single-track music card.
pub async fn fetch_meting_track(url: &str) -> Result<Option<Track>, LyricsError> {
    let body = get_json(url).await?;
    Ok(parse_single(&body))
}
