use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::clock::SessionClock;
use crate::matcher::{InputMatcher, Key, Transition};
use crate::mode::{FinishReason, Gamemode, ModeGate, Verdict};
use crate::paragraphs::Paragraph;
use crate::report::{SessionReport, SessionReportBuilder};
use crate::segmenter::segment;
use crate::sound::SoundKind;
use crate::word_timing::WordTimingTracker;

/// A key press with the time it arrived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keystroke {
    pub key: Key,
    pub at: DateTime<Local>,
}

impl Keystroke {
    pub fn new(key: Key, at: DateTime<Local>) -> Self {
        Self { key, at }
    }

    pub fn now(key: Key) -> Self {
        Self::new(key, Local::now())
    }
}

/// Work for the caller to carry out after a keystroke; the session itself
/// performs no I/O.
#[derive(Clone, Debug, PartialEq)]
pub enum SideEffect {
    Sound(SoundKind),
    Finished(SessionReport),
}

/// Snapshot of the live typing state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub cursor: usize,
    pub incorrect_overlay: BTreeMap<usize, char>,
    pub first_error_index: Option<usize>,
    pub consecutive_error_streak: u32,
    pub pinned_error_word: Option<usize>,
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
    pub completed: bool,
}

/// One attempt at typing one paragraph.
#[derive(Debug, Clone)]
pub struct TypingSession {
    paragraph: Paragraph,
    gate: ModeGate,
    matcher: InputMatcher,
    tracker: WordTimingTracker,
    clock: SessionClock,
    reporter: SessionReportBuilder,
    finish_reason: Option<FinishReason>,
}

impl TypingSession {
    pub fn new(paragraph: Paragraph, mode: Gamemode) -> Self {
        Self {
            matcher: InputMatcher::new(&paragraph.text),
            tracker: WordTimingTracker::new(segment(&paragraph.text)),
            gate: ModeGate::new(mode),
            clock: SessionClock::new(),
            reporter: SessionReportBuilder::new(),
            finish_reason: None,
            paragraph,
        }
    }

    pub fn apply_keystroke(&mut self, keystroke: Keystroke) -> Vec<SideEffect> {
        if self.reporter.is_completed() {
            return vec![];
        }

        let transition = self.matcher.apply(keystroke.key);
        if matches!(transition, Transition::Advanced { .. }) {
            self.clock.start(keystroke.at);
        }
        self.tracker.observe(&transition, keystroke.at);
        debug!(?transition, cursor = self.matcher.cursor(), "keystroke applied");

        let mut effects = Vec::new();
        if let Some(kind) = self.gate.sound_for(&transition) {
            effects.push(SideEffect::Sound(kind));
        }
        if let Verdict::Finish(reason) = self.gate.judge(&transition, &self.matcher) {
            if let Some(report) = self.finish(keystroke.at, reason) {
                effects.push(SideEffect::Finished(report));
            }
        }
        effects
    }

    /// Close the session and build its report. A second call is a no-op.
    pub fn finish(&mut self, now: DateTime<Local>, reason: FinishReason) -> Option<SessionReport> {
        if self.reporter.is_completed() {
            return None;
        }

        self.clock.start(now);
        self.clock.stop(now);
        let report = self.reporter.finalize(
            &self.paragraph,
            self.gate.mode(),
            &self.matcher,
            &self.tracker,
            &self.clock,
        )?;
        self.finish_reason = Some(reason);
        info!(?reason, paragraph = self.paragraph.id, "session finished");
        Some(report)
    }

    pub fn tick(&mut self, now: DateTime<Local>) -> Option<u64> {
        self.clock.tick(now)
    }

    /// Start over on the same paragraph.
    pub fn restart(&mut self) {
        let paragraph = self.paragraph.clone();
        self.replace_paragraph(paragraph);
    }

    pub fn replace_paragraph(&mut self, paragraph: Paragraph) {
        *self = Self::new(paragraph, self.gate.mode());
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            cursor: self.matcher.cursor(),
            incorrect_overlay: self.matcher.incorrect_overlay().clone(),
            first_error_index: self.matcher.first_error_index(),
            consecutive_error_streak: self.matcher.error_streak(),
            pinned_error_word: self.tracker.pinned_index(),
            started_at: self.clock.started_at(),
            finished_at: self.clock.stopped_at(),
            completed: self.reporter.is_completed(),
        }
    }

    pub fn paragraph(&self) -> &Paragraph {
        &self.paragraph
    }

    pub fn mode(&self) -> Gamemode {
        self.gate.mode()
    }

    pub fn matcher(&self) -> &InputMatcher {
        &self.matcher
    }

    pub fn tracker(&self) -> &WordTimingTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn is_completed(&self) -> bool {
        self.reporter.is_completed()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::CharState;
    use assert_matches::assert_matches;

    fn session(text: &str, mode: Gamemode) -> TypingSession {
        TypingSession::new(Paragraph::new(7, text), mode)
    }

    fn press(session: &mut TypingSession, key: Key) -> Vec<SideEffect> {
        session.apply_keystroke(Keystroke::now(key))
    }

    fn type_str(session: &mut TypingSession, s: &str) -> Vec<SideEffect> {
        s.chars()
            .flat_map(|c| press(session, Key::Char(c)))
            .collect()
    }

    fn finished_report(effects: &[SideEffect]) -> Option<&SessionReport> {
        effects.iter().find_map(|e| match e {
            SideEffect::Finished(report) => Some(report),
            SideEffect::Sound(_) => None,
        })
    }

    #[test]
    fn test_clean_run_produces_report() {
        let mut s = session("cat dog", Gamemode::Standard);

        let effects = type_str(&mut s, "cat dog");

        let report = finished_report(&effects).unwrap();
        assert_eq!(report.typed_word_count, 2);
        assert_eq!(report.wrongful_char_count, 0);
        assert_eq!(report.typed_char_count, 7);
        assert_eq!(report.paragraph_id, 7);
        assert_eq!(report.per_word_timing.len(), 2);
        assert!(s.is_completed());
        assert_eq!(s.finish_reason(), Some(FinishReason::Completed));
    }

    #[test]
    fn test_corrected_mistake_is_counted() {
        let mut s = session("cat dog", Gamemode::Standard);
        type_str(&mut s, "cax");
        assert_eq!(s.matcher().char_state(2), CharState::Error);

        press(&mut s, Key::Backspace);
        press(&mut s, Key::Backspace);
        assert_eq!(s.state().first_error_index, None);
        assert_eq!(s.state().pinned_error_word, None);

        let effects = type_str(&mut s, "at dog");

        let report = finished_report(&effects).unwrap();
        assert_eq!(report.per_word_timing[0].mistake_count, 1);
        assert_eq!(report.wrongful_char_count, 1);
        assert_eq!(report.typed_word_count, 2);
    }

    #[test]
    fn test_error_run_stays_red_until_backspaced() {
        let mut s = session("abcdef", Gamemode::Standard);
        type_str(&mut s, "axcde");

        for i in 1..5 {
            assert_eq!(s.matcher().char_state(i), CharState::Error);
        }
        assert_eq!(s.matcher().char_state(0), CharState::Correct);

        for _ in 0..4 {
            press(&mut s, Key::Backspace);
        }
        assert_eq!(s.state().first_error_index, None);
        assert_eq!(s.state().cursor, 1);
    }

    #[test]
    fn test_residual_error_blocks_completion() {
        let mut s = session("ab", Gamemode::Standard);

        let effects = type_str(&mut s, "xb");

        assert!(finished_report(&effects).is_none());
        assert!(!s.is_completed());
        assert_eq!(s.state().cursor, 2);
    }

    #[test]
    fn test_hardcore_first_mistake_finishes() {
        let mut s = session("abc", Gamemode::Hardcore);

        let effects = press(&mut s, Key::Char('x'));

        assert_eq!(effects[0], SideEffect::Sound(SoundKind::WrongHardcore));
        let report = finished_report(&effects).unwrap();
        assert_eq!(report.typed_char_count, 1);
        assert_eq!(report.wrongful_char_count, 1);
        assert_eq!(report.gamemode, Gamemode::Hardcore);
        assert_eq!(s.finish_reason(), Some(FinishReason::HardcoreMistake));
    }

    #[test]
    fn test_hardcore_finishes_exactly_once() {
        let mut s = session("abc", Gamemode::Hardcore);

        let mut effects = press(&mut s, Key::Char('x'));
        effects.extend(type_str(&mut s, "yzbc"));

        let finishes = effects
            .iter()
            .filter(|e| matches!(e, SideEffect::Finished(_)))
            .count();
        assert_eq!(finishes, 1);
        assert_eq!(s.state().cursor, 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut s = session("ab", Gamemode::Standard);
        type_str(&mut s, "ab");

        assert!(s.finish(Local::now(), FinishReason::Completed).is_none());
    }

    #[test]
    fn test_clock_starts_on_first_keystroke() {
        let mut s = session("ab", Gamemode::Standard);
        press(&mut s, Key::Backspace);
        assert!(s.state().started_at.is_none());

        press(&mut s, Key::Char('a'));
        assert!(s.state().started_at.is_some());
        assert!(s.clock().is_running());
    }

    #[test]
    fn test_finish_stops_clock() {
        let mut s = session("a", Gamemode::Standard);
        press(&mut s, Key::Char('a'));

        let state = s.state();
        assert!(state.completed);
        assert!(state.finished_at.is_some());
        assert_eq!(s.tick(Local::now()), None);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut s = session("cat", Gamemode::Short);
        type_str(&mut s, "cx");

        s.restart();

        let state = s.state();
        assert_eq!(state.cursor, 0);
        assert!(state.incorrect_overlay.is_empty());
        assert_eq!(state.first_error_index, None);
        assert!(state.started_at.is_none());
        assert!(!state.completed);
        assert_eq!(s.mode(), Gamemode::Short);
        assert_eq!(s.tracker().total_mistakes(), 0);
    }

    #[test]
    fn test_replace_paragraph() {
        let mut s = session("cat", Gamemode::Standard);
        type_str(&mut s, "cat");

        s.replace_paragraph(Paragraph::new(9, "dog"));

        assert_eq!(s.paragraph().id, 9);
        assert!(!s.is_completed());
        assert_matches!(
            finished_report(&type_str(&mut s, "dog")),
            Some(SessionReport { paragraph_id: 9, .. })
        );
    }

    #[test]
    fn test_unreached_words_excluded_from_report() {
        let mut s = session("one two three", Gamemode::Standard);
        type_str(&mut s, "one t");

        let report = s.finish(Local::now(), FinishReason::Completed).unwrap();

        assert_eq!(report.per_word_timing.len(), 2);
        assert_eq!(report.typed_word_count, 1);
        assert_eq!(report.typed_char_count, 5);
    }

    #[test]
    fn test_empty_paragraph_rejects_input() {
        let mut s = session("", Gamemode::Standard);

        let effects = type_str(&mut s, "abc");

        assert!(effects.is_empty());
        assert!(!s.is_completed());
        assert!(s.state().started_at.is_none());
    }
}
