use crate::paginate::NavInput;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::time::Duration;

/// Holds the terminal in raw mode for the scope of one key read; restores
/// cooked mode on drop so normal line output keeps working between reads.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Map a terminal key event to pagination navigation.
///
/// Arrow keys page/move, Enter confirms, `c` (or Esc) cancels, anything else
/// printable is offered to the session as a possible special action.
pub fn map_key(key: KeyEvent) -> Option<NavInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Right => Some(NavInput::NextPage),
        KeyCode::Left => Some(NavInput::PrevPage),
        KeyCode::Up => Some(NavInput::CursorUp),
        KeyCode::Down => Some(NavInput::CursorDown),
        KeyCode::Enter => Some(NavInput::Confirm),
        KeyCode::Esc => Some(NavInput::Cancel),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavInput::Cancel)
        }
        KeyCode::Char('c') | KeyCode::Char('C') => Some(NavInput::Cancel),
        KeyCode::Char(ch) => Some(NavInput::Key(ch.to_ascii_lowercase())),
        _ => None,
    }
}

/// Block until a key maps to a navigation input. `poll_interval` bounds how
/// long one wait iteration can take.
pub fn read_nav_input(poll_interval: Duration) -> io::Result<NavInput> {
    let _raw = RawModeGuard::new()?;
    loop {
        if event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = map_key(key) {
                    return Ok(input);
                }
            }
        }
    }
}
