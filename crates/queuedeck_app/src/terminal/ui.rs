//! Owns the terminal while the live dashboard runs.

use std::io::{self, Stdout};

use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use deck_logging::{deck_debug, deck_warn};
use futures_util::StreamExt;
use queuedeck_core::{DashboardView, Msg};
use queuedeck_engine::notice;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::input::{Input, KeyOutcome, Prompt};
use super::render::draw;

type Screen = Terminal<CrosstermBackend<Stdout>>;

/// Draws every new descriptor and forwards typed commands to the inbox until
/// `cancel` fires. Cancels the dashboard itself on quit or on a terminal error.
pub async fn run(
    views: watch::Receiver<DashboardView>,
    inbox: UnboundedSender<Msg>,
    cancel: CancellationToken,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, views, &inbox, &cancel).await;
    cancel.cancel();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Screen,
    mut views: watch::Receiver<DashboardView>,
    inbox: &UnboundedSender<Msg>,
    cancel: &CancellationToken,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut prompt = Prompt::default();
    let mut scroll: u16 = 0;

    loop {
        {
            let view = views.borrow_and_update();
            terminal.draw(|frame| draw(frame, &view, prompt.text(), scroll))?;
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            changed = views.changed() => {
                if changed.is_err() {
                    deck_debug!("Dashboard feed closed");
                    return Ok(());
                }
            }
            maybe_event = events.next() => {
                let key = match maybe_event {
                    Some(Ok(Event::Key(key))) => key,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        deck_warn!("Terminal input failed: {err}");
                        return Err(err);
                    }
                    None => return Ok(()),
                };
                match prompt.handle(key) {
                    KeyOutcome::Submitted(Input::Quit) | KeyOutcome::Quit => return Ok(()),
                    KeyOutcome::Submitted(input) => {
                        let msg = match input {
                            Input::Msg(msg) => msg,
                            Input::Invalid(hint) => notice(hint),
                            Input::Empty | Input::Quit => continue,
                        };
                        if inbox.send(msg).is_err() {
                            return Ok(());
                        }
                    }
                    KeyOutcome::Scroll(delta) => scroll = scroll.saturating_add_signed(delta),
                    KeyOutcome::Edited | KeyOutcome::Ignored => {}
                }
            }
        }
    }
}
