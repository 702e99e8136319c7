//! Interactive surface for Cadenza: the generic pagination engine, terminal
//! key mapping, and line-oriented rendering. The pagination session is a
//! pure state machine so every behavior is testable without a terminal.

pub mod help;
pub mod input;
pub mod paginate;
pub mod render;

pub use help::HelpMenu;
pub use input::{map_key, read_nav_input, RawModeGuard};
pub use paginate::{NavInput, PageEvent, PaginationSession};
pub use render::{clear_screen, format_clock, now_playing_line, render_page};
