use crate::lyrics::types::{EMPTY_LINE_PLACEHOLDER, LyricLine, LyricTimeline};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

const FULLWIDTH_COLON: char = '\u{FF1A}';

/// Parse a timestamp tag body (`mm:ss`, `mm:ss.xx`, `ss` or `ss.xxx`) into
/// seconds. Returns `None` for anything that is not a well-formed timestamp,
/// which also covers LRC header tags such as `[ar:Artist]`.
pub fn parse_timestamp(token: &str) -> Option<f64> {
    let normalized = token.trim().replace(FULLWIDTH_COLON, ":");
    if normalized.is_empty() {
        return None;
    }
    match normalized.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes = parse_digits(minutes.trim())?;
            let seconds = parse_seconds(seconds.trim())?;
            Some(minutes as f64 * 60.0 + seconds)
        }
        None => parse_seconds(&normalized),
    }
}

fn parse_seconds(raw: &str) -> Option<f64> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, digits)) => (whole, parse_fraction(digits)?),
        None => (raw, 0.0),
    };
    Some(parse_digits(whole)? as f64 + fraction)
}

fn parse_digits(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// `digits / 10^len(digits)`: `.5`, `.50` and `.500` are all half a second.
fn parse_fraction(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return Some(0.0);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    format!("0.{digits}").parse().ok()
}

/// Parse a single LRC line into zero or more lyric lines, one per valid
/// timestamp tag. All tags are stripped from the text.
pub fn parse_line(line: &str) -> Vec<LyricLine> {
    let tags: Vec<_> = TAG_RE.captures_iter(line).collect();
    if tags.is_empty() {
        return Vec::new();
    }
    let stripped = TAG_RE.replace_all(line, "");
    let text = match stripped.trim() {
        "" => EMPTY_LINE_PLACEHOLDER,
        t => t,
    };
    tags.iter()
        .filter_map(|cap| cap.get(1).and_then(|m| parse_timestamp(m.as_str())))
        .map(|time| LyricLine {
            time,
            text: text.to_string(),
        })
        .collect()
}

/// Parse a whole LRC document into a sorted timeline.
pub fn parse_timeline(source: &str) -> LyricTimeline {
    let lines = source.lines().flat_map(parse_line).collect();
    LyricTimeline::new(lines)
}
