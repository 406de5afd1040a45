// pool.rs: Central event loop for playback ticks, commands and lyric loading

use crate::event::{Event, Followup, LyricRequest, PlayerCommand, UpdateSender, process_event, switch_track};
use crate::lyrics::Track;
use crate::lyrics::meting::{fetch_meting_playlist, fetch_meting_track};
use crate::lyrics::source::{load_timeline, read_lyrics_file};
use crate::state::{Playlist, StateBundle, Update, initial_header};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior};

/// Build the card's lyric request: text from `--lrc-file` (the embedded
/// lyrics of the card) plus the `--lrc` source.
pub async fn initial_request(config: &crate::Config) -> LyricRequest {
    let inline = match config.lrc_file.as_deref() {
        Some(path) => match read_lyrics_file(Path::new(path)).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to read lyrics file");
                None
            }
        },
        None => None,
    };
    LyricRequest {
        inline,
        source: config.lrc.clone(),
    }
}

/// Fetch the configured playlist, if any. Failures leave it empty.
async fn initial_playlist(config: &crate::Config) -> Playlist {
    let (Some(api), Some(id)) = (config.playlist_api.as_deref(), config.playlist_id.as_deref()) else {
        return Playlist::default();
    };
    match fetch_meting_playlist(api, &config.server, &config.playlist_type, id).await {
        Ok(tracks) => Playlist::new(tracks),
        Err(e) => {
            tracing::warn!(api, id, error = %e, "Playlist fetch error");
            Playlist::default()
        }
    }
}

fn spawn_lyrics_load(
    generation: u64,
    request: LyricRequest,
    base_url: Option<String>,
    event_tx: mpsc::Sender<Event>,
) {
    tokio::spawn(async move {
        let timeline = load_timeline(
            request.inline.as_deref(),
            request.source.as_deref(),
            base_url.as_deref(),
        )
        .await;
        let _ = event_tx.send(Event::LyricsLoaded { generation, timeline }).await;
    });
}

fn spawn_meting_load(generation: u64, url: String, event_tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let track = match fetch_meting_track(&url).await {
            Ok(track) => track,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Meting fetch error");
                None
            }
        };
        let _ = event_tx.send(Event::MetingLoaded { generation, track }).await;
    });
}

/// Runs the player: applies commands, loads lyrics, and emits an `Update`
/// on every visible state change. Returns when the command channel closes,
/// a `Shutdown` command arrives or the UI stops listening.
pub async fn listen(
    update_tx: mpsc::Sender<Update>,
    mut cmd_rx: mpsc::Receiver<PlayerCommand>,
    config: crate::Config,
) {
    let mut state = StateBundle::new();
    let mut sender = UpdateSender::new(update_tx);
    let (event_tx, mut event_rx) = mpsc::channel(8);

    let lyrics = initial_request(&config).await;
    let (title, artist) = initial_header(
        config.title.as_deref(),
        config.artist.as_deref(),
        config.meting.is_some(),
    );
    state.update_track(&Track {
        title,
        artist,
        duration: config.duration.unwrap_or(0.0),
        ..Default::default()
    });
    state.seek(config.start);
    state.playlist = initial_playlist(&config).await;

    if let Some(track) = state.playlist.current().cloned() {
        if let Followup::LoadLyrics(request) = switch_track(&mut state, &track) {
            spawn_lyrics_load(state.generation, request, config.base_url.clone(), event_tx.clone());
        }
    } else {
        let generation = state.begin_source();
        match &config.meting {
            Some(url) => spawn_meting_load(generation, url.clone(), event_tx.clone()),
            None => spawn_lyrics_load(generation, lyrics.clone(), config.base_url.clone(), event_tx.clone()),
        }
    }
    if !config.paused {
        state.set_playing(true);
    }
    if !sender.send(&state, true).await {
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let event = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => Event::Command(cmd),
                None => break,
            },
            Some(ev) = event_rx.recv() => ev,
            _ = ticker.tick() => Event::TimeUpdate,
        };
        let force = !matches!(event, Event::TimeUpdate);
        match process_event(event, &mut state, &lyrics) {
            Followup::Shutdown => break,
            Followup::LoadLyrics(request) => {
                spawn_lyrics_load(state.generation, request, config.base_url.clone(), event_tx.clone())
            }
            Followup::None => {}
        }
        if !sender.send(&state, force).await {
            break;
        }
    }
    tracing::debug!("Player loop stopped");
}
