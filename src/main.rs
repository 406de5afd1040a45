mod event;
mod lyrics;
mod pool;
mod state;
mod text_utils;
mod timer;
mod ui;

use clap::Parser;
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Lyric source: an http(s) URL, a site path starting with '/', or the LRC text itself
    #[arg(long)]
    pub lrc: Option<String>,
    /// Read embedded lyrics from a local LRC file (takes precedence over --lrc)
    #[arg(long, value_name = "PATH")]
    pub lrc_file: Option<String>,
    /// Track title
    #[arg(long)]
    pub title: Option<String>,
    /// Track artist
    #[arg(long)]
    pub artist: Option<String>,
    /// Track length in seconds; playback stops when it is reached
    #[arg(long)]
    pub duration: Option<f64>,
    /// Meting API URL for the track's metadata and lyric source
    #[arg(long)]
    pub meting: Option<String>,
    /// Meting API URL; plays the tracks of --playlist-id in order
    #[arg(long, value_name = "API_URL", requires = "playlist_id")]
    pub playlist_api: Option<String>,
    /// Playlist id for --playlist-api
    #[arg(long, value_name = "ID")]
    pub playlist_id: Option<String>,
    /// Music server queried through --playlist-api
    #[arg(long, default_value = "netease")]
    pub server: String,
    /// Meting resource type for --playlist-api
    #[arg(long, default_value = "playlist")]
    pub playlist_type: String,
    /// Print the playlist tracks as JSON and exit
    #[arg(long, requires = "playlist_api")]
    pub list: bool,
    /// Site origin used to resolve lyric paths starting with '/'.
    /// If empty, the LYRICARD_BASE_URL env var will be used as a fallback.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Pipe current lyric line to stdout (default is the full-screen card)
    #[arg(long)]
    pub pipe: bool,
    /// Swap lyric lines instantly instead of cross-fading
    #[arg(long)]
    pub no_animation: bool,
    /// Playback time update interval in milliseconds
    #[arg(long, default_value_t = 250)]
    pub tick_ms: u64,
    /// Start position in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,
    /// Start paused
    #[arg(long)]
    pub paused: bool,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

fn base_url_from_env_if_empty(cli: &mut Config) {
    if cli.base_url.is_none()
        && let Ok(s) = std::env::var("LYRICARD_BASE_URL")
    {
        let s = s.trim();
        if !s.is_empty() {
            cli.base_url = Some(s.to_string());
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "lyricard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    base_url_from_env_if_empty(&mut cfg);
    init_logging(cfg.debug_log);
    tracing::debug!(?cfg, "Starting");

    if cfg.list
        && let (Some(api), Some(id)) = (cfg.playlist_api.as_deref(), cfg.playlist_id.as_deref())
    {
        let tracks = lyrics::meting::fetch_meting_playlist(api, &cfg.server, &cfg.playlist_type, id).await?;
        println!("{}", serde_json::to_string_pretty(&tracks)?);
        return Ok(());
    }

    let result = if cfg.pipe {
        crate::ui::pipe::display_lyrics_pipe(cfg).await
    } else {
        crate::ui::modern::display_lyrics_modern(cfg).await
    };

    // Print error if any, for better diagnostics
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}
