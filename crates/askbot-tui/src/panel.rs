//! The chat panel: open/closed state plus every affordance the exchange
//! controller drives.

use askbot_core::{ChatMessage, ChatSurface, Transcript};
use tracing::debug;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug)]
pub struct ChatPanel {
    open: bool,

    // Input field
    input: String,
    cursor: usize, // cursor position in input, in chars
    input_focused: bool,

    // Transcript view
    transcript: Transcript,
    /// Lines scrolled up from the bottom; 0 follows the newest message
    scroll_back: u16,

    composing: bool,
    send_enabled: bool,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self {
            open: false,
            input: String::new(),
            cursor: 0,
            input_focused: false,
            transcript: Transcript::new(),
            scroll_back: 0,
            composing: false,
            send_enabled: true,
        }
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        self.input_focused = true;
        debug!("chat opened");
    }

    pub fn close(&mut self) {
        self.open = false;
        self.input_focused = false;
        debug!("chat closed");
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn is_send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Transcript scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Clamp the scroll-back to what the rendered transcript can show.
    pub fn clamp_scroll_back(&mut self, max: u16) {
        self.scroll_back = self.scroll_back.min(max);
    }
}

impl ChatSurface for ChatPanel {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn focus_input(&mut self) {
        self.input_focused = self.open;
    }

    fn append(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        self.scroll_back = 0;
    }

    fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
        if composing {
            self.scroll_back = 0;
        }
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }
}
