//! Full-screen music card for the terminal.
//!
//! Shows title and artist, the active lyric line with its cross-fade, a
//! progress bar and the time display. The event loop uses `tokio::select!`
//! to handle:
//! - Player updates from the backend loop
//! - Keyboard input (space, arrows, Home, digits, n/p, q/ESC)
//! - Timer wakeups for line changes and animation frames

use crate::event::PlayerCommand;
use crate::pool;
use crate::state::Update;
use crate::ui::progression::{estimate_update, next_wake, present};
use crate::ui::styles::LyricStyles;
use crate::ui::transition::LyricDisplay;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::pin::Pin;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::Sleep;

const SEEK_STEP: f64 = 5.0;

/// UI state for the modern TUI mode
pub struct ModernUIState {
    pub last_update: Option<Update>,
    /// Instant when the last Update was received; used to estimate current position
    pub last_update_instant: Option<Instant>,
    pub display: LyricDisplay,
    pub should_exit: bool,
}

impl ModernUIState {
    pub fn new(animations_supported: bool) -> Self {
        Self {
            last_update: None,
            last_update_instant: None,
            display: LyricDisplay::new(animations_supported),
            should_exit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Quit,
    Player(PlayerCommand),
}

/// Map a key press to a UI action.
pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyAction::Player(PlayerCommand::TogglePlay)),
        KeyCode::Home => Some(KeyAction::Player(PlayerCommand::SeekTo(0.0))),
        KeyCode::Left => Some(KeyAction::Player(PlayerCommand::SeekBy(-SEEK_STEP))),
        KeyCode::Right => Some(KeyAction::Player(PlayerCommand::SeekBy(SEEK_STEP))),
        KeyCode::Char('n') => Some(KeyAction::Player(PlayerCommand::NextTrack)),
        KeyCode::Char('p') => Some(KeyAction::Player(PlayerCommand::PreviousTrack)),
        KeyCode::Char(d) if d.is_ascii_digit() => {
            let tenth = d.to_digit(10).unwrap_or(0) as f64 / 10.0;
            Some(KeyAction::Player(PlayerCommand::SeekFraction(tenth)))
        }
        _ => None,
    }
}

/// Display lyrics in modern TUI mode (centered card with cross-fades)
pub async fn display_lyrics_modern(
    config: crate::Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let animations_supported = !config.no_animation;
    let (tx, mut rx) = mpsc::channel(32);
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    tokio::spawn(pool::listen(tx, cmd_rx, config));

    enable_raw_mode().map_err(to_boxed_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(to_boxed_err)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(to_boxed_err)?;
    let styles = LyricStyles::default();
    let mut state = ModernUIState::new(animations_supported);
    let mut next_sleep: Option<Pin<Box<Sleep>>> = None;

    // Single background thread polling crossterm and forwarding events to
    // the async runtime; exits once the receiver is gone.
    let (event_tx, mut event_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(ev) = crossterm::event::read()
                        && event_tx.blocking_send(ev).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {
                    if event_tx.is_closed() {
                        break;
                    }
                }
                Err(_) => thread::sleep(Duration::from_millis(100)),
            }
        }
    });

    let result = async {
        while !state.should_exit {
            tokio::select! {
                biased;

                update = rx.recv() => {
                    match update {
                        Some(update) => {
                            state.last_update = Some(update);
                            state.last_update_instant = Some(Instant::now());
                        }
                        None => state.should_exit = true,
                    }
                }

                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(event) => process_event(event, &mut state, &cmd_tx).await,
                        None => state.should_exit = true,
                    }
                }

                _ = async {
                    if let Some(s) = &mut next_sleep {
                        s.as_mut().await;
                    } else {
                        futures_util::future::pending::<()>().await;
                    }
                } => {}
            }
            redraw_and_reschedule(&mut terminal, &mut state, &styles, &mut next_sleep)?;
        }
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    }
    .await;

    let _ = cmd_tx.send(PlayerCommand::Shutdown).await;
    disable_raw_mode().map_err(to_boxed_err)?;
    execute!(io::stdout(), LeaveAlternateScreen).map_err(to_boxed_err)?;
    result
}

/// Estimate the current state, feed the lyric display, draw, and schedule
/// the next wakeup.
fn redraw_and_reschedule<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ModernUIState,
    styles: &LyricStyles,
    next_sleep: &mut Option<Pin<Box<Sleep>>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Instant::now();
    let Some(upd) = estimate_update(&state.last_update, state.last_update_instant, now) else {
        *next_sleep = None;
        return Ok(());
    };
    if let Some(tr) = present(&mut state.display, &upd, now) {
        tracing::trace!(from = ?tr.from, to = %tr.to, animated = tr.animated, "Lyric transition");
    }
    terminal
        .draw(|f| crate::ui::modern_helpers::draw_card(f, &upd, &state.display, styles, now))
        .map_err(to_boxed_err)?;
    *next_sleep = next_wake(&upd, &state.display, now)
        .map(|d| Box::pin(tokio::time::sleep_until(tokio::time::Instant::now() + d)));
    Ok(())
}

/// Handle user input events (keyboard)
async fn process_event(event: Event, state: &mut ModernUIState, cmd_tx: &mpsc::Sender<PlayerCommand>) {
    let Event::Key(key) = event else {
        return;
    };
    match key_action(&key) {
        Some(KeyAction::Quit) => state.should_exit = true,
        Some(KeyAction::Player(cmd)) => {
            if cmd_tx.send(cmd).await.is_err() {
                state.should_exit = true;
            }
        }
        None => {}
    }
}

fn to_boxed_err<E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_player_keys() {
        assert_eq!(key_action(&key(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(key_action(&key(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(
            key_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            key_action(&key(KeyCode::Char(' '))),
            Some(KeyAction::Player(PlayerCommand::TogglePlay))
        );
        assert_eq!(
            key_action(&key(KeyCode::Left)),
            Some(KeyAction::Player(PlayerCommand::SeekBy(-5.0)))
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('3'))),
            Some(KeyAction::Player(PlayerCommand::SeekFraction(0.3)))
        );
        assert_eq!(
            key_action(&key(KeyCode::Home)),
            Some(KeyAction::Player(PlayerCommand::SeekTo(0.0)))
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('n'))),
            Some(KeyAction::Player(PlayerCommand::NextTrack))
        );
        assert_eq!(key_action(&key(KeyCode::Char('x'))), None);
    }
}
