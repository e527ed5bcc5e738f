mod input;
mod render;
mod theme;
mod ui;

pub use render::{dashboard_text, TerminalSink};
pub use ui::run as run_terminal;
