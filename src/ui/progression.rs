use crate::state::Update;
use crate::ui::transition::{LyricDisplay, Transition};
use std::time::{Duration, Instant};

/// Redraw cadence while a cross-fade is running.
pub const ANIMATION_FRAME: Duration = Duration::from_millis(33);
/// Redraw cadence for the clock while playing.
pub const CLOCK_FRAME: Duration = Duration::from_millis(250);

/// Advance `last_update` by the time elapsed since it was received and
/// re-resolve the active line locally, so lines change on time even between
/// backend updates.
pub fn estimate_update(last_update: &Option<Update>, received: Option<Instant>, now: Instant) -> Option<Update> {
    let mut tmp = last_update.clone()?;
    if tmp.playing
        && let Some(since) = received
    {
        tmp.position += now.saturating_duration_since(since).as_secs_f64();
        if tmp.duration > 0.0 {
            tmp.position = tmp.position.min(tmp.duration);
        }
    }
    tmp.index = tmp.timeline.resolve(tmp.position);
    Some(tmp)
}

/// Feed the display with what `upd` says should be on screen. Timeline lines
/// animate; notices and the title/artist fallback are swapped in statically.
pub fn present(display: &mut LyricDisplay, upd: &Update, now: Instant) -> Option<Transition> {
    if upd.has_lyrics() {
        display.show(&upd.display_text(), now)
    } else if upd.loading || upd.err.is_some() {
        display.show_static(&upd.display_text())
    } else {
        display.show_fallback(&upd.title, &upd.artist)
    }
}

/// How long the UI may sleep before something visible changes.
pub fn next_wake(upd: &Update, display: &LyricDisplay, now: Instant) -> Option<Duration> {
    if display.is_animating(now) {
        return Some(ANIMATION_FRAME);
    }
    if !upd.playing {
        return None;
    }
    let until_next_line = upd
        .timeline
        .next_time_after(upd.position)
        .map(|t| Duration::from_secs_f64((t - upd.position).max(0.0)));
    Some(until_next_line.map_or(CLOCK_FRAME, |d| d.min(CLOCK_FRAME)))
}
