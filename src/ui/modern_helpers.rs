use crate::state::Update;
use crate::text_utils::{time_display, wrap_lines};
use crate::ui::styles::LyricStyles;
use crate::ui::transition::{LyricDisplay, SlotFrame};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Gauge, Paragraph};
use std::time::Instant;

/// Pixel offset of the web card that maps to one terminal row.
const PX_PER_ROW: f64 = 12.0;

const HELP: &str = "space play/pause   \u{2190}/\u{2192} seek 5s   0-9/Home jump   n/p track   q quit";

/// Where to draw a slot of `height` rows: vertically centred in `area`,
/// shifted by the animation's translation and kept inside `area`.
pub fn slot_rect(area: Rect, height: u16, translate_y: f64) -> Rect {
    let height = height.min(area.height);
    let centred = area.y as i32 + (area.height - height) as i32 / 2;
    let shift = (translate_y / PX_PER_ROW).round() as i32;
    let max_y = (area.y + area.height - height) as i32;
    let y = (centred + shift).clamp(area.y as i32, max_y) as u16;
    Rect { x: area.x, y, width: area.width, height }
}

fn draw_slot(f: &mut Frame, area: Rect, slot: &SlotFrame<'_>, style: Style) {
    let rows = wrap_lines(slot.text, area.width as usize);
    let rect = slot_rect(area, rows.len() as u16, slot.style.translate_y);
    let lines: Vec<Line> = rows.into_iter().map(|r| Line::styled(r, style)).collect();
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

/// Draw the whole card: header, overlapping lyric slots, progress and help.
pub fn draw_card(
    f: &mut Frame,
    upd: &Update,
    display: &LyricDisplay,
    styles: &LyricStyles,
    now: Instant,
) {
    let [header, lyric, controls, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let header_lines = vec![
        Line::styled(upd.title.clone(), styles.title),
        Line::styled(upd.artist.clone(), styles.artist),
    ];
    f.render_widget(Paragraph::new(header_lines).alignment(Alignment::Center), header);

    // Outgoing line first so the incoming one wins where they overlap.
    if let Some(slot) = display.exiting_frame(now)
        && let Some(style) = styles.slot(styles.exiting_rgb, &slot.style)
    {
        draw_slot(f, lyric, &slot, style);
    }
    if let Some(slot) = display.current_frame(now)
        && let Some(style) = styles.slot(styles.current_rgb, &slot.style)
    {
        draw_slot(f, lyric, &slot, style);
    }

    let marker = if upd.playing { "\u{25B6}" } else { "\u{23F8}" };
    let clock = format!("{marker} {}", time_display(upd.position, upd.duration));
    let [bar, time] = Layout::horizontal([
        Constraint::Min(4),
        Constraint::Length(clock.chars().count() as u16 + 2),
    ])
    .areas(controls);
    let gauge = Gauge::default()
        .gauge_style(styles.progress)
        .ratio(upd.progress_percent() / 100.0)
        .label("");
    f.render_widget(gauge, bar);
    f.render_widget(Paragraph::new(clock).style(styles.time).alignment(Alignment::Right), time);
    f.render_widget(Paragraph::new(HELP).style(styles.help).alignment(Alignment::Center), help);
}
