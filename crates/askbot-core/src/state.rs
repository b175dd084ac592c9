//! UI-agnostic chat state types
//!
//! This module contains data structures that are shared between different UIs
//! and don't depend on any specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single rendered chat message. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    text: String,
    origin: Origin,
    sent_at: DateTime<Local>,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    User,
    Bot,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self::at(text, origin, Local::now())
    }

    pub fn at(text: impl Into<String>, origin: Origin, sent_at: DateTime<Local>) -> Self {
        Self {
            text: text.into(),
            origin,
            sent_at,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Bot)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Two-digit hour and minute, e.g. `09:05`
    pub fn time_label(&self) -> String {
        self.sent_at.format("%H:%M").to_string()
    }
}

/// Ordered, append-only list of chat messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}
