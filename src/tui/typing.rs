//! "AI is typing" animation
//!
//! A periodic task that only emits frames; it knows nothing about the chat
//! session and is aborted once no reply is outstanding.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::event::Event;

pub struct TypingIndicator {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl TypingIndicator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Start emitting frames; no-op while already running
    pub fn start(&mut self, tx: mpsc::UnboundedSender<Event>) {
        if self.is_running() {
            return;
        }

        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut dots: u8 = 0;
            loop {
                ticker.tick().await;
                dots = (dots + 1) % 4;
                if tx.send(Event::Typing(dots)).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `AI is typing` followed by `dots` dots
pub fn typing_text(dots: u8) -> String {
    format!("AI is typing{}", ".".repeat(dots as usize % 4))
}
