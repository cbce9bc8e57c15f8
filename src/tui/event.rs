//! TUI event handling
//!
//! Keyboard input, tick events, typing-indicator frames and backend replies
//! all arrive on one channel.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::ChatError;

/// TUI events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize,
    /// Tick for periodic redraws
    Tick,
    /// Typing indicator frame (number of dots)
    Typing(u8),
    /// Backend finished answering a personality
    Reply {
        key: String,
        outcome: Result<String, ChatError>,
    },
}

/// Event handler that combines keyboard, tick and application events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler and the sender application tasks use
    pub fn new(tick_rate: Duration) -> (Self, mpsc::UnboundedSender<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let key_tx = tx.clone();
        std::thread::spawn(move || loop {
            if event::poll(tick_rate).unwrap_or(false) {
                let sent = match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        key_tx.send(Event::Key(key))
                    }
                    Ok(CrosstermEvent::Resize(..)) => key_tx.send(Event::Resize),
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            } else if key_tx.send(Event::Tick).is_err() {
                break;
            }
        });

        (EventHandler { rx }, tx)
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    /// Submit the input line or the popup form
    Submit,
    Char(char),
    Backspace,
    /// Previous personality
    Up,
    /// Next personality
    Down,
    ScrollUp,
    ScrollDown,
    OpenAddPersonality,
    /// Switch popup field
    NextField,
    /// Close the popup or clear the input line
    Cancel,
}

/// Map a key event to an action
pub fn map_key_event(key: KeyEvent, popup_open: bool) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyAction::Quit,
            KeyCode::Char('n') if !popup_open => KeyAction::OpenAddPersonality,
            _ => KeyAction::None,
        };
    }

    match key.code {
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Esc => KeyAction::Cancel,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Tab | KeyCode::BackTab if popup_open => KeyAction::NextField,
        KeyCode::Up if !popup_open => KeyAction::Up,
        KeyCode::Down if !popup_open => KeyAction::Down,
        KeyCode::PageUp if !popup_open => KeyAction::ScrollUp,
        KeyCode::PageDown if !popup_open => KeyAction::ScrollDown,
        KeyCode::Char(c) => KeyAction::Char(c),
        _ => KeyAction::None,
    }
}
