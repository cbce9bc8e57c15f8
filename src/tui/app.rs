//! # TUI Application State

use std::collections::HashMap;

use crate::conversation::Message;
use crate::core::{ChatError, ChatSession, PendingReply, Reply};
use crate::personality::Personality;

use super::event::KeyAction;

/// Typing this on the input line exits
const QUIT_COMMAND: &str = "quit";

/// Lines moved per scroll step
const SCROLL_STEP: u16 = 5;

/// Which popup field receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Description,
}

/// "Add personality" popup
#[derive(Debug, Clone, Default)]
pub struct AddPersonalityForm {
    pub name: String,
    pub description: String,
    pub focus: FormField,
}

impl AddPersonalityForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Description => &mut self.description,
        }
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Name,
        };
    }
}

/// Main application state
pub struct App {
    pub session: ChatSession,
    /// Text being typed on the input line
    pub input: String,
    /// Open popup, if any
    pub popup: Option<AddPersonalityForm>,
    /// Last failed reply per personality, shown until the next submission
    pub errors: HashMap<String, String>,
    pub status_message: Option<String>,
    /// Lines scrolled up from the bottom of the chat pane
    pub scroll_back: u16,
    /// Current typing indicator frame
    pub typing_dots: u8,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: ChatSession) -> Self {
        App {
            session,
            input: String::new(),
            popup: None,
            errors: HashMap::new(),
            status_message: None,
            scroll_back: 0,
            typing_dots: 0,
            should_quit: false,
        }
    }

    pub fn active(&self) -> Option<&Personality> {
        self.session.active()
    }

    pub fn conversation(&self) -> &[Message] {
        self.session.conversation()
    }

    /// Title of the chat pane
    pub fn chat_title(&self) -> String {
        self.active().map(|p| p.profile.title()).unwrap_or_default()
    }

    pub fn active_is_awaiting(&self) -> bool {
        self.active()
            .map_or(false, |p| self.session.is_awaiting(p.key()))
    }

    pub fn any_awaiting(&self) -> bool {
        self.session
            .catalog()
            .iter()
            .any(|p| self.session.is_awaiting(p.key()))
    }

    /// Error to show under the active conversation
    pub fn active_error(&self) -> Option<&str> {
        self.active()
            .and_then(|p| self.errors.get(p.key()))
            .map(String::as_str)
    }

    /// Apply a key action. Returns a request to hand to the backend when a
    /// message was submitted.
    pub fn handle_action(&mut self, action: KeyAction) -> Option<PendingReply> {
        if self.popup.is_some() {
            self.handle_popup_action(action);
            return None;
        }

        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Submit => return self.submit_input(),
            KeyAction::Char(c) => self.input.push(c),
            KeyAction::Backspace => {
                self.input.pop();
            }
            KeyAction::Cancel => self.input.clear(),
            KeyAction::Up => self.select_previous(),
            KeyAction::Down => self.select_next(),
            KeyAction::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP),
            KeyAction::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP),
            KeyAction::OpenAddPersonality => {
                self.popup = Some(AddPersonalityForm::default());
            }
            KeyAction::NextField | KeyAction::None => {}
        }
        None
    }

    fn handle_popup_action(&mut self, action: KeyAction) {
        let Some(form) = self.popup.as_mut() else {
            return;
        };

        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Cancel => self.popup = None,
            KeyAction::NextField => form.next_field(),
            KeyAction::Char(c) => form.focused_mut().push(c),
            KeyAction::Backspace => {
                form.focused_mut().pop();
            }
            KeyAction::Submit => self.save_personality(),
            _ => {}
        }
    }

    /// Add the personality from the popup. Incomplete forms are discarded.
    fn save_personality(&mut self) {
        let Some(form) = self.popup.take() else {
            return;
        };
        if form.name.trim().is_empty() || form.description.trim().is_empty() {
            return;
        }

        match self.session.add_personality(&form.name, &form.description) {
            Ok(_) => {
                self.status_message = Some(format!("Added personality {}", form.name.trim()));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn submit_input(&mut self) -> Option<PendingReply> {
        let text = std::mem::take(&mut self.input);
        if text.trim().eq_ignore_ascii_case(QUIT_COMMAND) {
            self.should_quit = true;
            return None;
        }

        match self.session.submit(&text) {
            Ok(pending) => {
                self.errors.remove(&pending.key);
                self.scroll_back = 0;
                self.status_message = None;
                Some(pending)
            }
            Err(e) => {
                // Keep what was typed so it can be resent
                self.input = text;
                self.status_message = Some(e.to_string());
                None
            }
        }
    }

    /// Fold a backend result into the session
    pub fn apply_reply(&mut self, key: &str, outcome: Result<String, ChatError>) {
        match self.session.complete(key, outcome) {
            Reply::Message(_) => {
                self.errors.remove(key);
            }
            Reply::Error(text) => {
                self.status_message = Some(format!("{}: {}", key, text));
                self.errors.insert(key.to_string(), text);
            }
        }
    }

    pub fn select_previous(&mut self) {
        let catalog = self.session.catalog();
        if catalog.is_empty() {
            return;
        }
        let len = catalog.len();
        let index = (self.session.active_index() + len - 1) % len;
        self.select(index);
    }

    pub fn select_next(&mut self) {
        let catalog = self.session.catalog();
        if catalog.is_empty() {
            return;
        }
        let len = catalog.len();
        let index = (self.session.active_index() + 1) % len;
        self.select(index);
    }

    fn select(&mut self, index: usize) {
        if self.session.select(index).is_ok() {
            self.scroll_back = 0;
        }
    }
}
