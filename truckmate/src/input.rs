//! Single-line text fields for the TUI forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// An editable single-line field.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    masked: bool,
    max_len: Option<usize>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Password field: rendered as bullets.
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    #[cfg(test)]
    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// Apply an editing key. Returns false when the key is not an edit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                if self
                    .max_len
                    .is_some_and(|max| self.value.chars().count() >= max)
                {
                    return true;
                }
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    /// Text as it should appear on screen.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Which field of a form has the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCursor {
    index: usize,
    len: usize,
}

impl FieldCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn previous(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
