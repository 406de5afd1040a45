use crate::pool;
use crate::state::Update;
use crate::ui::progression::present;
use crate::ui::transition::LyricDisplay;
use std::io::{self, Write};
use std::time::Instant;
use tokio::sync::mpsc;

/// Display lyrics in pipe mode (stdout only, for scripting). Prints each
/// newly displayed line once; see [`write_lines`] for when it returns.
pub async fn display_lyrics_pipe(
    config: crate::Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (tx, mut rx) = mpsc::channel(32);
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    tokio::spawn(pool::listen(tx, cmd_rx, config));

    let mut stdout = io::stdout();
    write_lines(&mut rx, &mut stdout).await?;
    drop(cmd_tx);
    Ok(())
}

/// Write every displayed line to `out`. Pipe mode has no controls, so it
/// stops once nothing else can change:
/// - playback stopped after playing (the track ended), before the rewound
///   first line is printed;
/// - lyrics are loaded but playback is paused;
/// - the duration is unknown and the last line has been printed.
pub async fn write_lines<W: Write>(rx: &mut mpsc::Receiver<Update>, out: &mut W) -> io::Result<()> {
    // Terminal output cannot animate, so text is swapped instantly.
    let mut display = LyricDisplay::new(false);
    let mut was_playing = false;

    while let Some(upd) = rx.recv().await {
        if was_playing && !upd.playing {
            tracing::debug!("Playback stopped, leaving pipe mode");
            break;
        }
        was_playing = upd.playing;
        if upd.loading {
            continue;
        }
        if let Some(tr) = present(&mut display, &upd, Instant::now()) {
            writeln!(out, "{}", tr.to)?;
            out.flush()?;
        }
        let last_line_shown = upd.duration <= 0.0 && upd.timeline.next_time_after(upd.position).is_none();
        if !upd.playing || last_line_shown {
            break;
        }
    }
    Ok(())
}
