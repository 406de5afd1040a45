use crate::lyrics::{LyricTimeline, Track};
use crate::state::{StateBundle, Update};
use tokio::sync::mpsc;

/// User-facing player controls, sent from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    /// Absolute position in seconds.
    SeekTo(f64),
    /// Relative seek in seconds.
    SeekBy(f64),
    /// Fraction of the track duration, as from a progress-bar click.
    SeekFraction(f64),
    /// Step through the loaded playlist.
    NextTrack,
    PreviousTrack,
    Shutdown,
}

/// Lyric request for a track: inline text embedded in the card and/or an
/// external source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricRequest {
    pub inline: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug)]
pub enum Event {
    Command(PlayerCommand),
    /// Metadata lookup finished for the source with this generation.
    MetingLoaded { generation: u64, track: Option<Track> },
    LyricsLoaded { generation: u64, timeline: LyricTimeline },
    /// Periodic playback-time update.
    TimeUpdate,
}

/// What the event loop should do after an event was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Followup {
    None,
    /// Start loading lyrics for the current generation.
    LoadLyrics(LyricRequest),
    Shutdown,
}

/// Pushes `Update` snapshots, skipping ones the receiver already has.
#[derive(Debug)]
pub struct UpdateSender {
    tx: mpsc::Sender<Update>,
    last_key: Option<u64>,
}

impl UpdateSender {
    pub fn new(tx: mpsc::Sender<Update>) -> Self {
        Self { tx, last_key: None }
    }

    pub async fn send(&mut self, state: &StateBundle, force: bool) -> bool {
        let playing_bit: u64 = if state.player_state.playing { 1 } else { 0 };
        let key = (state.version << 1) | playing_bit;
        if !force && self.last_key == Some(key) {
            return true;
        }
        if self.tx.send(state.snapshot()).await.is_err() {
            return false;
        }
        self.last_key = Some(key);
        true
    }
}

pub fn process_event(event: Event, state: &mut StateBundle, lyrics: &LyricRequest) -> Followup {
    match event {
        Event::Command(cmd) => handle_command(cmd, state),
        Event::MetingLoaded { generation, track } => handle_meting(generation, track, state, lyrics),
        Event::LyricsLoaded { generation, timeline } => {
            state.commit_lyrics(generation, timeline);
            Followup::None
        }
        Event::TimeUpdate => handle_time_update(state),
    }
}

fn handle_command(cmd: PlayerCommand, state: &mut StateBundle) -> Followup {
    match cmd {
        PlayerCommand::TogglePlay => {
            let playing = !state.player_state.playing;
            if playing && state.player_state.has_ended() {
                state.seek(0.0);
            }
            state.set_playing(playing);
        }
        PlayerCommand::SeekTo(pos) => state.seek(pos),
        PlayerCommand::SeekBy(delta) => {
            let pos = state.player_state.estimate_position() + delta;
            state.seek(pos);
        }
        PlayerCommand::SeekFraction(frac) => {
            let duration = state.player_state.duration;
            if duration > 0.0 {
                state.seek(frac.clamp(0.0, 1.0) * duration);
            }
        }
        PlayerCommand::NextTrack => {
            if let Some(track) = state.playlist.advance().cloned() {
                return switch_track(state, &track);
            }
        }
        PlayerCommand::PreviousTrack => {
            if let Some(track) = state.playlist.back().cloned() {
                return switch_track(state, &track);
            }
        }
        PlayerCommand::Shutdown => return Followup::Shutdown,
    }
    Followup::None
}

/// Make `track` the current source and request its lyrics.
pub fn switch_track(state: &mut StateBundle, track: &Track) -> Followup {
    let generation = state.load_track(track);
    tracing::debug!(generation, id = %track.id, title = %track.title, "Switching track");
    let source = Some(track.lrc.clone()).filter(|lrc| !lrc.trim().is_empty());
    Followup::LoadLyrics(LyricRequest { inline: None, source })
}

fn handle_meting(
    generation: u64,
    track: Option<Track>,
    state: &mut StateBundle,
    lyrics: &LyricRequest,
) -> Followup {
    if generation != state.generation {
        return Followup::None;
    }
    match track {
        Some(track) => {
            state.update_track(&track);
            // A Meting lyric source replaces whatever the card embedded.
            let request = if track.lrc.trim().is_empty() {
                lyrics.clone()
            } else {
                LyricRequest { inline: None, source: Some(track.lrc.clone()) }
            };
            Followup::LoadLyrics(request)
        }
        None => {
            state.loading = false;
            state.player_state.err = Some("Error loading music data".to_string());
            state.version += 1;
            Followup::None
        }
    }
}

/// Re-resolve the active line for the current playback time. At the end of
/// a track, moves on to the next playlist entry or pauses and rewinds.
pub fn handle_time_update(state: &mut StateBundle) -> Followup {
    if !state.player_state.playing {
        return Followup::None;
    }
    if state.player_state.has_ended() {
        tracing::debug!("Track ended");
        if let Some(track) = state.playlist.advance().cloned() {
            return switch_track(state, &track);
        }
        state.set_playing(false);
        state.seek(0.0);
        return Followup::None;
    }
    state.update_index(state.player_state.estimate_position());
    Followup::None
}
