use std::collections::BTreeMap;

/// Maximum run of erroneous characters before input is locked out.
pub const STREAK_CAP: u32 = 20;

/// A keystroke as seen by the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The error streak reached [`STREAK_CAP`]; only backspace is accepted.
    Lockout,
    /// The cursor already sits past the last character.
    EndOfText,
    /// Non-printable key, or backspace at the start of the text.
    Ignored,
}

/// Result of feeding one key into the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Rejected(RejectReason),
    Deleted {
        /// Cursor after the deletion.
        cursor: usize,
        /// The backspace moved the cursor onto or before the first error.
        error_cleared: bool,
    },
    Advanced {
        /// Index of the character that was typed (the pre-transition cursor).
        index: usize,
        outcome: Outcome,
        /// A correct character typed while an earlier mistake is unresolved.
        in_error_run: bool,
        /// This keystroke opened a new error run.
        error_started: bool,
    },
}

/// How a character should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Error,
    Cursor,
    Pending,
}

/// Cursor, correctness overlay and error-streak gate for one paragraph.
#[derive(Debug, Clone)]
pub struct InputMatcher {
    text: Vec<char>,
    cursor: usize,
    incorrect_overlay: BTreeMap<usize, char>,
    first_error_index: Option<usize>,
    error_streak: u32,
}

impl InputMatcher {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            cursor: 0,
            incorrect_overlay: BTreeMap::new(),
            first_error_index: None,
            error_streak: 0,
        }
    }

    pub fn apply(&mut self, key: Key) -> Transition {
        match key {
            Key::Backspace => self.backspace(),
            Key::Char(c) => self.write(c),
            Key::Other => Transition::Rejected(RejectReason::Ignored),
        }
    }

    fn backspace(&mut self) -> Transition {
        if self.cursor == 0 {
            return Transition::Rejected(RejectReason::Ignored);
        }

        self.cursor -= 1;
        self.incorrect_overlay.remove(&self.cursor);

        let error_cleared = matches!(self.first_error_index, Some(first) if self.cursor <= first);
        if error_cleared {
            self.first_error_index = None;
        }
        self.error_streak = self.error_streak.saturating_sub(1);

        Transition::Deleted {
            cursor: self.cursor,
            error_cleared,
        }
    }

    fn write(&mut self, c: char) -> Transition {
        if self.is_locked() {
            return Transition::Rejected(RejectReason::Lockout);
        }
        if self.cursor >= self.text.len() {
            return Transition::Rejected(RejectReason::EndOfText);
        }

        let index = self.cursor;
        self.cursor += 1;

        if c == self.text[index] {
            self.incorrect_overlay.remove(&index);

            let in_error_run = matches!(self.first_error_index, Some(first) if index >= first);
            if in_error_run {
                self.error_streak += 1;
            } else {
                self.error_streak = 0;
            }

            Transition::Advanced {
                index,
                outcome: Outcome::Correct,
                in_error_run,
                error_started: false,
            }
        } else {
            self.incorrect_overlay.insert(index, c);

            let error_started = self.first_error_index.is_none();
            if error_started {
                self.first_error_index = Some(index);
            }
            self.error_streak += 1;

            Transition::Advanced {
                index,
                outcome: Outcome::Incorrect,
                in_error_run: true,
                error_started,
            }
        }
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn first_error_index(&self) -> Option<usize> {
        self.first_error_index
    }

    pub fn error_streak(&self) -> u32 {
        self.error_streak
    }

    pub fn incorrect_overlay(&self) -> &BTreeMap<usize, char> {
        &self.incorrect_overlay
    }

    pub fn is_locked(&self) -> bool {
        self.error_streak >= STREAK_CAP
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.text.len()
    }

    pub fn has_unresolved_error(&self) -> bool {
        self.first_error_index.is_some()
    }

    /// Everything from the first unresolved mistake up to the cursor is drawn
    /// as an error, even characters that were typed correctly.
    pub fn char_state(&self, index: usize) -> CharState {
        if index < self.cursor {
            match self.first_error_index {
                Some(first) if index >= first => CharState::Error,
                _ => CharState::Correct,
            }
        } else if index == self.cursor {
            CharState::Cursor
        } else {
            CharState::Pending
        }
    }

    /// The character to show at `index`: what was mistyped there, or the text.
    pub fn display_char(&self, index: usize) -> Option<char> {
        self.incorrect_overlay
            .get(&index)
            .copied()
            .or_else(|| self.text.get(index).copied())
    }
}
