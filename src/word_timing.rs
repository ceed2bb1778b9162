use chrono::{DateTime, Local};
use tracing::{trace, warn};

use crate::matcher::{Outcome, Transition};
use crate::segmenter::WordSpan;

/// Timing and mistakes for a single word of the paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub span: WordSpan,
    pub mistakes: u32,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
}

impl WordTiming {
    fn new(span: WordSpan) -> Self {
        Self {
            span,
            mistakes: 0,
            start_time: None,
            end_time: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Per-word bookkeeping driven by matcher transitions.
///
/// While an error run is open every keystroke is attributed to the word that
/// holds the first mistake (the pinned word), stored as an index into `words`.
#[derive(Debug, Clone, Default)]
pub struct WordTimingTracker {
    words: Vec<WordTiming>,
    pinned: Option<usize>,
}

impl WordTimingTracker {
    pub fn new(spans: Vec<WordSpan>) -> Self {
        Self {
            words: spans.into_iter().map(WordTiming::new).collect(),
            pinned: None,
        }
    }

    pub fn observe(&mut self, transition: &Transition, at: DateTime<Local>) {
        match *transition {
            Transition::Rejected(_) => {}
            Transition::Deleted { error_cleared, .. } => {
                if error_cleared {
                    self.pinned = None;
                }
            }
            Transition::Advanced {
                index,
                outcome,
                error_started,
                ..
            } => {
                let target = if error_started {
                    let located = self.locate(index);
                    self.pinned = located;
                    located
                } else {
                    self.pinned.or_else(|| self.locate(index))
                };

                let Some(target) = target else {
                    if outcome == Outcome::Incorrect {
                        warn!(index, "no word covers mistyped index, dropping mistake");
                    } else {
                        trace!(index, "keystroke outside any word");
                    }
                    return;
                };

                let word = &mut self.words[target];
                word.start_time.get_or_insert(at);

                match outcome {
                    Outcome::Incorrect => word.mistakes += 1,
                    Outcome::Correct => {
                        if index == word.span.end_index {
                            word.end_time.get_or_insert(at);
                        }
                    }
                }
            }
        }
    }

    fn locate(&self, index: usize) -> Option<usize> {
        self.words.iter().position(|w| w.span.covers(index))
    }

    pub fn words(&self) -> &[WordTiming] {
        &self.words
    }

    pub fn pinned_index(&self) -> Option<usize> {
        self.pinned
    }

    pub fn pinned_word(&self) -> Option<&WordTiming> {
        self.pinned.and_then(|i| self.words.get(i))
    }

    pub fn total_mistakes(&self) -> u32 {
        self.words.iter().map(|w| w.mistakes).sum()
    }

    pub fn completed_words(&self) -> usize {
        self.words.iter().filter(|w| w.is_complete()).count()
    }
}
