use std::time::{Duration, Instant};

use thiserror::Error;
use timekeep::elapsed::ClockParseError;

/// A text input with mid-string cursor support.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(s: &str) -> Self {
        Self {
            value: s.to_string(),
            cursor: s.len(),
        }
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert only ASCII digits; everything else is ignored.
    pub fn insert_digit(&mut self, c: char) {
        if c.is_ascii_digit() {
            self.insert(c);
        }
    }

    /// Delete the character immediately before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let new_cursor = self.prev_boundary(self.cursor);
        self.value.drain(new_cursor..self.cursor);
        self.cursor = new_cursor;
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary(self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.next_boundary(self.cursor);
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Returns the string split at the cursor: (before, after).
    pub fn split_at_cursor(&self) -> (&str, &str) {
        (&self.value[..self.cursor], &self.value[self.cursor..])
    }

    /// One bullet per character, for password fields.
    pub fn masked(&self) -> String {
        "•".repeat(self.value.chars().count())
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        let mut p = pos - 1;
        while !self.value.is_char_boundary(p) {
            p -= 1;
        }
        p
    }

    fn next_boundary(&self, pos: usize) -> usize {
        let mut p = pos + 1;
        while p <= self.value.len() && !self.value.is_char_boundary(p) {
            p += 1;
        }
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::Success => "Успешно",
            NotificationKind::Error => "Ошибка",
        }
    }
}

/// Transient status line message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Form validation failures, checked before any request is sent.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Поле «{0}» обязательно")]
    Required(&'static str),
    #[error("Неверное время: {0}")]
    Clock(#[from] ClockParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_moves_over_cyrillic() {
        let mut input = TextInput::with_value("Привет");
        input.backspace();
        assert_eq!(input.value, "Приве");

        input.move_left();
        input.move_left();
        input.insert('x');
        assert_eq!(input.value, "Приxве");
        assert_eq!(input.split_at_cursor(), ("Приx", "ве"));
    }

    #[test]
    fn digit_fields_reject_letters() {
        let mut input = TextInput::new();
        for c in "1a2:".chars() {
            input.insert_digit(c);
        }
        assert_eq!(input.value, "12");
    }

    #[test]
    fn masked_counts_characters_not_bytes() {
        assert_eq!(TextInput::with_value("пароль").masked().chars().count(), 6);
    }

    #[test]
    fn notification_expires() {
        let n = Notification::new(NotificationKind::Success, "ok", Duration::from_secs(4));
        assert!(!n.is_expired(Instant::now()));
        assert!(n.is_expired(Instant::now() + Duration::from_secs(5)));
    }
}
