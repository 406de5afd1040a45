// state.rs: State data structures for lyrics and player

use crate::lyrics::{LyricTimeline, Track};
use crate::timer::PlaybackTimer;
use std::sync::Arc;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const LOADING: &str = "Loading...";
pub const LOADING_LYRICS: &str = "Loading lyrics...";

/// Snapshot of player and lyric state pushed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub timeline: Arc<LyricTimeline>,
    /// Active line, `None` before the first timestamp.
    pub index: Option<usize>,
    pub position: f64,
    pub duration: f64,
    pub playing: bool,
    pub title: String,
    pub artist: String,
    /// Lyrics for the current source are still being fetched.
    pub loading: bool,
    pub err: Option<String>,
    pub version: u64, // Incremented on any state change
}

impl Update {
    /// Text the lyric slot should show: the active line, the first line
    /// before playback reaches it, or (without a timeline) a loading notice,
    /// the error, or `title - artist`.
    pub fn display_text(&self) -> String {
        if let Some(text) = self.timeline.display_text(self.index) {
            return text.to_string();
        }
        if self.loading {
            LOADING_LYRICS.to_string()
        } else if let Some(err) = &self.err {
            err.clone()
        } else {
            fallback_text(&self.title, &self.artist)
        }
    }

    /// True when the lyric slot shows a timeline line.
    pub fn has_lyrics(&self) -> bool {
        !self.timeline.is_empty()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

pub fn fallback_text(title: &str, artist: &str) -> String {
    format!("{title} - {artist}")
}

/// Card header before any metadata lookup: configured values, `Loading...`
/// while a Meting lookup is pending, otherwise the unknown placeholders.
pub fn initial_header(title: Option<&str>, artist: Option<&str>, meting_pending: bool) -> (String, String) {
    let pick = |value: Option<&str>, unknown: &str| match value.filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None if meting_pending => LOADING.to_string(),
        None => unknown.to_string(),
    };
    (pick(title, UNKNOWN_TITLE), pick(artist, UNKNOWN_ARTIST))
}

/// Holds the current state of the player (track info, playback, errors).
#[derive(Debug, Default)]
pub struct PlayerState {
    pub title: String,
    pub artist: String,
    /// Seconds, 0 when unknown.
    pub duration: f64,
    pub playing: bool,
    pub timer: PlaybackTimer,
    pub err: Option<String>,
}

impl PlayerState {
    /// Switch to a different track: new metadata, duration and position 0.
    pub fn load_track(&mut self, track: &Track) {
        self.title = track.title.clone();
        self.artist = track.artist.clone();
        self.duration = track.duration;
        self.err = None;
        self.timer.seek(0.0);
    }
    pub fn update_from_track(&mut self, track: &Track) {
        self.title = track.title.clone();
        self.artist = track.artist.clone();
        if track.duration > 0.0 {
            self.duration = track.duration;
        }
        self.err = None;
    }
    pub fn estimate_position(&self) -> f64 {
        self.timer.position()
    }
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        if playing {
            self.timer.play();
        } else {
            self.timer.pause();
        }
    }
    pub fn seek(&mut self, position: f64) {
        let position = if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        };
        self.timer.seek(position);
    }
    /// True once a known duration has been reached.
    pub fn has_ended(&self) -> bool {
        self.duration > 0.0 && self.estimate_position() >= self.duration
    }
}

/// Tracks queued from a Meting playlist and the one currently loaded.
#[derive(Debug, Default)]
pub struct Playlist {
    pub tracks: Vec<Track>,
    pub index: usize,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks, index: 0 }
    }
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }
    pub fn advance(&mut self) -> Option<&Track> {
        if self.index + 1 >= self.tracks.len() {
            return None;
        }
        self.index += 1;
        self.current()
    }
    pub fn back(&mut self) -> Option<&Track> {
        if self.index == 0 || self.tracks.is_empty() {
            return None;
        }
        self.index -= 1;
        self.current()
    }
}

/// Holds the current timeline and the active line index.
#[derive(Debug, Default)]
pub struct LyricState {
    pub timeline: Arc<LyricTimeline>,
    pub index: Option<usize>,
}

impl LyricState {
    pub fn get_index(&self, position: f64) -> Option<usize> {
        self.timeline.resolve(position)
    }
    pub fn update_timeline(&mut self, timeline: LyricTimeline) {
        self.index = None;
        self.timeline = Arc::new(timeline);
    }
    pub fn update_index(&mut self, new_index: Option<usize>) -> bool {
        if new_index != self.index {
            self.index = new_index;
            true
        } else {
            false
        }
    }
}

/// Bundles all state for the player and lyrics, plus versioning.
#[derive(Debug, Default)]
pub struct StateBundle {
    pub lyric_state: LyricState,
    pub player_state: PlayerState,
    pub playlist: Playlist,
    /// Identifies the lyric source whose results may be committed.
    pub generation: u64,
    pub loading: bool,
    pub version: u64, // Incremented on any state change
}

impl StateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading a new lyric source. Drops the old timeline and returns
    /// the generation that results must carry to be accepted.
    pub fn begin_source(&mut self) -> u64 {
        self.generation += 1;
        self.lyric_state.update_timeline(LyricTimeline::default());
        self.loading = true;
        self.version += 1;
        self.generation
    }

    /// Install a parsed timeline if it belongs to the current source.
    pub fn commit_lyrics(&mut self, generation: u64, timeline: LyricTimeline) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding lyrics for a stale source"
            );
            return false;
        }
        tracing::debug!(lines = timeline.len(), "Lyrics loaded");
        self.lyric_state.update_timeline(timeline);
        self.loading = false;
        let position = self.player_state.estimate_position();
        self.lyric_state.index = self.lyric_state.get_index(position);
        self.version += 1;
        true
    }

    /// Replace the current track. Returns the generation its lyrics must
    /// be committed with.
    pub fn load_track(&mut self, track: &Track) -> u64 {
        self.player_state.load_track(track);
        self.begin_source()
    }

    pub fn update_track(&mut self, track: &Track) {
        self.player_state.update_from_track(track);
        self.version += 1;
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.player_state.playing != playing {
            self.player_state.set_playing(playing);
            self.version += 1;
        }
    }

    pub fn seek(&mut self, position: f64) {
        self.player_state.seek(position);
        self.version += 1;
        self.update_index(self.player_state.estimate_position());
    }

    pub fn update_index(&mut self, position: f64) -> bool {
        let new_index = self.lyric_state.get_index(position);
        let changed = self.lyric_state.update_index(new_index);
        if changed {
            self.version += 1;
        }
        changed
    }

    pub fn snapshot(&self) -> Update {
        Update {
            timeline: self.lyric_state.timeline.clone(),
            index: self.lyric_state.index,
            position: self.player_state.estimate_position(),
            duration: self.player_state.duration,
            playing: self.player_state.playing,
            title: self.player_state.title.clone(),
            artist: self.player_state.artist.clone(),
            loading: self.loading,
            err: self.player_state.err.clone(),
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse::parse_timeline;

    #[test]
    fn stale_generation_is_ignored() {
        let mut state = StateBundle::new();
        let old = state.begin_source();
        let new = state.begin_source();
        assert!(!state.commit_lyrics(old, parse_timeline("[00:00.00]old")));
        assert!(state.lyric_state.timeline.is_empty());
        assert!(state.loading);
        assert!(state.commit_lyrics(new, parse_timeline("[00:00.00]new")));
        assert_eq!(state.lyric_state.timeline.lines()[0].text, "new");
        assert!(!state.loading);
    }

    #[test]
    fn commit_resolves_cursor_at_current_position() {
        let mut state = StateBundle::new();
        state.player_state.seek(3.0);
        let generation = state.begin_source();
        state.commit_lyrics(generation, parse_timeline("[00:00.00]Hello\n[00:02.50]World"));
        assert_eq!(state.lyric_state.index, Some(1));
    }

    #[test]
    fn update_index_bumps_version_only_on_change() {
        let mut state = StateBundle::new();
        let generation = state.begin_source();
        state.commit_lyrics(generation, parse_timeline("[00:01.00]a\n[00:02.00]b"));
        let v = state.version;
        assert!(!state.update_index(0.5));
        assert_eq!(state.version, v);
        assert!(state.update_index(1.0));
        assert!(!state.update_index(1.5));
        assert_eq!(state.version, v + 1);
    }

    #[test]
    fn display_text_falls_back_to_title_and_artist() {
        let update = Update {
            title: "Song".into(),
            artist: "Band".into(),
            ..Default::default()
        };
        assert_eq!(update.display_text(), "Song - Band");
    }

    #[test]
    fn loading_and_error_notices() {
        let loading = Update { loading: true, ..Default::default() };
        assert_eq!(loading.display_text(), LOADING_LYRICS);
        let failed = Update { err: Some("boom".into()), ..Default::default() };
        assert_eq!(failed.display_text(), "boom");
    }

    #[test]
    fn header_defaults() {
        assert_eq!(
            initial_header(None, Some(""), false),
            (UNKNOWN_TITLE.to_string(), UNKNOWN_ARTIST.to_string())
        );
        assert_eq!(
            initial_header(Some("Song"), None, true),
            ("Song".to_string(), LOADING.to_string())
        );
    }

    #[test]
    fn playlist_navigation_stops_at_the_ends() {
        let track = |id: &str| Track { id: id.into(), ..Default::default() };
        let mut playlist = Playlist::new(vec![track("a"), track("b")]);
        assert!(playlist.back().is_none());
        assert_eq!(playlist.advance().map(|t| t.id.as_str()), Some("b"));
        assert!(playlist.advance().is_none());
        assert_eq!(playlist.current().map(|t| t.id.as_str()), Some("b"));
        assert_eq!(playlist.back().map(|t| t.id.as_str()), Some("a"));
        assert!(Playlist::default().advance().is_none());
    }

    #[test]
    fn loading_a_track_resets_position_and_lyrics() {
        let mut state = StateBundle::new();
        let generation = state.begin_source();
        state.commit_lyrics(generation, parse_timeline("[00:00.00]old"));
        state.seek(42.0);
        let track = Track { title: "Next".into(), duration: 90.0, ..Default::default() };
        let next = state.load_track(&track);
        assert_eq!(next, generation + 1);
        assert!(state.lyric_state.timeline.is_empty());
        assert_eq!(state.player_state.estimate_position(), 0.0);
        assert_eq!(state.player_state.title, "Next");
        assert_eq!(state.player_state.duration, 90.0);
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut state = StateBundle::new();
        state.player_state.duration = 10.0;
        state.seek(25.0);
        assert_eq!(state.player_state.estimate_position(), 10.0);
        assert!(state.player_state.has_ended());
    }

    #[test]
    fn progress_percent() {
        let update = Update { position: 30.0, duration: 120.0, ..Default::default() };
        assert_eq!(update.progress_percent(), 25.0);
        let unknown = Update { position: 30.0, ..Default::default() };
        assert_eq!(unknown.progress_percent(), 0.0);
    }
}
