//! # TUI Module
//!
//! Terminal chat client: personality list, chat pane and input line.

pub mod app;
pub mod event;
pub mod typing;
pub mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::core::{ChatBackend, ChatSession, PendingReply};

pub use app::App;
pub use event::{Event, EventHandler};

use event::map_key_event;
use typing::TypingIndicator;

/// Redraw rate when idle
const TICK_RATE: Duration = Duration::from_millis(250);

/// Typing indicator frame interval
const TYPING_INTERVAL: Duration = Duration::from_millis(500);

/// Run the chat UI until the user quits
pub async fn run(session: ChatSession, backend: Arc<dyn ChatBackend>) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = or_restore(enter_terminal(), restore_terminal)?;

    let mut app = App::new(session);
    let (mut events, event_tx) = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &mut events, event_tx, backend).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("Application error: {}", e);
    }
    result
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Leave raw mode and the alternate screen, ignoring failures
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Pass `step` through, calling `restore` first if it failed
fn or_restore<T>(step: Result<T>, restore: impl FnOnce()) -> Result<T> {
    if step.is_err() {
        restore();
    }
    step
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    event_tx: mpsc::UnboundedSender<Event>,
    backend: Arc<dyn ChatBackend>,
) -> Result<()> {
    let mut typing = TypingIndicator::new(TYPING_INTERVAL);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let Some(event) = events.next().await else {
            break;
        };

        match event {
            Event::Key(key) => {
                let action = map_key_event(key, app.popup.is_some());
                if let Some(pending) = app.handle_action(action) {
                    spawn_reply(backend.clone(), pending, event_tx.clone());
                    typing.start(event_tx.clone());
                }
            }
            Event::Reply { key, outcome } => {
                app.apply_reply(&key, outcome);
                if !app.any_awaiting() {
                    typing.stop();
                }
            }
            Event::Typing(dots) => app.typing_dots = dots,
            Event::Tick | Event::Resize => {}
        }

        if app.should_quit {
            break;
        }
    }

    typing.stop();
    Ok(())
}

/// Ask the backend on its own task; the result comes back as an event
fn spawn_reply(
    backend: Arc<dyn ChatBackend>,
    pending: PendingReply,
    event_tx: mpsc::UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        tracing::debug!(key = %pending.key, messages = pending.history.len(), "requesting reply");
        let outcome = backend
            .reply(&pending.instruction, &pending.history)
            .await;
        // The UI may already be gone
        let _ = event_tx.send(Event::Reply {
            key: pending.key,
            outcome,
        });
    });
}
