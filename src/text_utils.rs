// src/text_utils.rs
// Utility functions for text formatting

/// Format seconds as `M:SS`. Non-finite or negative values read `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `current / duration` as shown next to the progress bar.
pub fn time_display(current: f64, duration: f64) -> String {
    format!("{} / {}", format_time(current), format_time(duration))
}

/// Wrap a lyric line to the given width; always yields at least one row.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let rows: Vec<String> = textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|c| c.into_owned())
        .collect();
    if rows.is_empty() { vec![String::new()] } else { rows }
}
