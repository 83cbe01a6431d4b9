use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::config::UiConfig;
use crate::controller::ConversationController;
use crate::ui::conversation::{ConversationAction, ConversationManager};

const TICK: Duration = Duration::from_millis(120);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Restores the terminal even if the loop bails out early
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn setup_terminal() -> Result<(Tui, TerminalGuard)> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let guard = TerminalGuard;
    execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("Failed to create terminal")?;
    Ok((terminal, guard))
}

/// Run the interactive chat until the user exits
pub async fn run(controller: ConversationController, ui: UiConfig) -> Result<()> {
    let (mut terminal, _guard) = setup_terminal()?;
    let mut manager = ConversationManager::new(controller, ui);
    info!(session = %manager.controller().session_id(), "interactive session started");

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        terminal
            .draw(|frame| manager.render(frame.size(), frame.buffer_mut()))
            .context("Failed to draw frame")?;

        // The tick keeps settlements and the indicator moving while the user is idle.
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if manager.handle_key(key) == ConversationAction::Exit {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                None => {
                    warn!("terminal event stream ended");
                    break;
                }
            },
            _ = ticker.tick() => {}
        }

        manager.tick();
    }

    info!(
        session = %manager.controller().session_id(),
        entries = manager.controller().transcript().len(),
        "interactive session ended"
    );
    Ok(())
}
