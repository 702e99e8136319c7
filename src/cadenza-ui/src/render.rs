use crate::paginate::PaginationSession;
use cadenza_core::{PlaybackInfo, PlaybackStatus};
use crossterm::{cursor::MoveTo, execute, terminal::{Clear, ClearType}};
use std::io::{self, Write};

/// Render a pagination page as printable lines: header, numbered rows with
/// a selector marker, and a footer listing the available keys.
pub fn render_page(session: &PaginationSession, title: &str) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} ({} items) - Page {}/{}",
        title,
        session.item_count(),
        session.page() + 1,
        session.page_count().max(1)
    ));
    lines.push(String::new());

    let first_index = session.flat_index() - session.cursor();
    for (row, item) in session.visible_items().iter().enumerate() {
        let selector = if row == session.cursor() { "> " } else { "  " };
        lines.push(format!("{}{}. {}", selector, first_index + row + 1, item.display));
    }

    lines.push(String::new());
    lines.push("  \u{2192} / \u{2190} - Next/Previous page".to_string());
    lines.push("  \u{2191} / \u{2193} - Move selector".to_string());
    lines.push("  Enter - Select".to_string());
    for action in session.special_actions() {
        lines.push(format!("  {} - {}", action.key, action.label));
    }
    lines.push("  c - Cancel".to_string());
    lines
}

/// `MM:SS`, with hours folded into minutes the way players usually do.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Single status line for the `now` command.
pub fn now_playing_line(info: &PlaybackInfo) -> String {
    match info.status {
        PlaybackStatus::Stopped => "Nothing playing".to_string(),
        PlaybackStatus::Error => format!(
            "Playback error: {}",
            info.error.as_deref().unwrap_or("unknown")
        ),
        _ => {
            let track = info.track_name.as_deref().unwrap_or("Unknown Track");
            let mut line = format!("[{}] {}", info.status.label(), track);
            if let Some(artist) = info.artist.as_deref().filter(|a| !a.is_empty()) {
                line.push_str(&format!(" - {artist}"));
            }
            let position = format_clock(info.position_seconds);
            match info.duration_seconds {
                Some(duration) => line.push_str(&format!(
                    " ({position}/{})",
                    format_clock(duration)
                )),
                None => line.push_str(&format!(" ({position})")),
            }
            if let Some(source) = info.source.as_deref() {
                line.push_str(&format!(" [{source}]"));
            }
            line
        }
    }
}

pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.flush()
}
