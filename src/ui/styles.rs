use crate::ui::transition::Keyframe;
use ratatui::style::{Color, Modifier, Style};

/// Below this opacity a slot is not drawn at all.
const MIN_VISIBLE_OPACITY: f64 = 0.05;
/// Blur radius from which a slot is drawn dimmed.
const DIM_BLUR: f64 = 1.0;

pub struct LyricStyles {
    pub title: Style,
    pub artist: Style,
    pub progress: Style,
    pub time: Style,
    pub help: Style,
    /// Colour of the fully opaque current line.
    pub current_rgb: (u8, u8, u8),
    /// Colour of the outgoing line at the start of its fade.
    pub exiting_rgb: (u8, u8, u8),
}

impl LyricStyles {
    /// Terminal style approximating a slot at `frame`: opacity scales the
    /// colour towards black, blur dims. `None` when invisible.
    pub fn slot(&self, rgb: (u8, u8, u8), frame: &Keyframe) -> Option<Style> {
        if frame.opacity < MIN_VISIBLE_OPACITY {
            return None;
        }
        let o = frame.opacity.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * o).round() as u8;
        let mut style = Style::default()
            .fg(Color::Rgb(scale(rgb.0), scale(rgb.1), scale(rgb.2)))
            .add_modifier(Modifier::BOLD);
        if frame.blur >= DIM_BLUR {
            style = style.add_modifier(Modifier::DIM);
        }
        Some(style)
    }
}

impl Default for LyricStyles {
    fn default() -> Self {
        Self {
            title: Style::default().add_modifier(Modifier::BOLD),
            artist: Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            progress: Style::default().fg(Color::Green).bg(Color::DarkGray),
            time: Style::default().add_modifier(Modifier::DIM),
            help: Style::default().fg(Color::DarkGray),
            current_rgb: (120, 220, 140),
            exiting_rgb: (200, 200, 200),
        }
    }
}
