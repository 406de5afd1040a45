use once_cell::sync::Lazy;
use reqwest::Client;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("lyricard/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

/// Placeholder shown for timestamped lines that carry no text.
pub const EMPTY_LINE_PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
}

/// Lyric lines sorted by start time.
///
/// Built once per lyric source and never mutated afterwards; a new source
/// produces a new timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricTimeline {
    lines: Vec<LyricLine>,
}

impl LyricTimeline {
    /// Build a timeline, stable-sorting `lines` by time so that lines with
    /// equal timestamps keep their encounter order.
    pub fn new(mut lines: Vec<LyricLine>) -> Self {
        lines.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { lines }
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last line whose time is `<= position`, or `None` before
    /// the first line (or when the timeline is empty).
    pub fn resolve(&self, position: f64) -> Option<usize> {
        let mut current = None;
        for (idx, line) in self.lines.iter().enumerate() {
            if line.time <= position {
                current = Some(idx);
            } else {
                break;
            }
        }
        current
    }

    /// Text to display for a resolved cursor. Before the first timestamp the
    /// first line is shown so the card never starts blank.
    pub fn display_text(&self, index: Option<usize>) -> Option<&str> {
        index
            .and_then(|i| self.lines.get(i))
            .or_else(|| self.lines.first())
            .map(|line| line.text.as_str())
    }

    /// Start time of the first line strictly after `position`.
    pub fn next_time_after(&self, position: f64) -> Option<f64> {
        self.lines
            .iter()
            .map(|l| l.time)
            .find(|&t| t > position)
    }
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn http_client() -> &'static Client {
    &HTTP_CLIENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(time: f64, text: &str) -> LyricLine {
        LyricLine { time, text: text.to_string() }
    }

    fn abc() -> LyricTimeline {
        LyricTimeline::new(vec![line(0.0, "A"), line(2.0, "B"), line(5.0, "C")])
    }

    fn text_at(timeline: &LyricTimeline, t: f64) -> Option<&str> {
        timeline
            .resolve(t)
            .and_then(|i| timeline.lines().get(i))
            .map(|l| l.text.as_str())
    }

    #[test]
    fn resolves_last_line_at_or_before_position() {
        let tl = abc();
        assert_eq!(tl.resolve(-1.0), None);
        assert_eq!(text_at(&tl, 0.0), Some("A"));
        assert_eq!(text_at(&tl, 1.9), Some("A"));
        assert_eq!(text_at(&tl, 2.0), Some("B"));
        assert_eq!(text_at(&tl, 100.0), Some("C"));
    }

    #[test]
    fn empty_timeline_never_resolves() {
        let tl = LyricTimeline::default();
        for t in [-5.0, 0.0, 3.5, 1e9] {
            assert_eq!(tl.resolve(t), None);
        }
        assert_eq!(tl.display_text(None), None);
    }

    #[test]
    fn nan_position_resolves_to_none() {
        assert_eq!(abc().resolve(f64::NAN), None);
    }

    #[test]
    fn resolution_is_repeatable() {
        let tl = abc();
        let first = tl.resolve(3.3);
        for _ in 0..5 {
            assert_eq!(tl.resolve(3.3), first);
        }
    }

    #[test]
    fn new_keeps_encounter_order_for_equal_times() {
        let tl = LyricTimeline::new(vec![line(3.0, "late"), line(1.0, "x"), line(1.0, "y")]);
        let texts: Vec<_> = tl.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["x", "y", "late"]);
    }

    #[test]
    fn display_text_falls_back_to_first_line() {
        let tl = LyricTimeline::new(vec![line(4.0, "intro"), line(8.0, "verse")]);
        assert_eq!(tl.display_text(tl.resolve(1.0)), Some("intro"));
        assert_eq!(tl.display_text(tl.resolve(9.0)), Some("verse"));
    }

    #[test]
    fn next_time_after_skips_current_line() {
        let tl = abc();
        assert_eq!(tl.next_time_after(2.0), Some(5.0));
        assert_eq!(tl.next_time_after(-1.0), Some(0.0));
        assert_eq!(tl.next_time_after(5.0), None);
    }
}
