use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::SessionClock;
use crate::matcher::InputMatcher;
use crate::mode::Gamemode;
use crate::paragraphs::Paragraph;
use crate::time_series::TimeSeriesPoint;
use crate::util::{accuracy_percent, words_per_minute};
use crate::word_timing::{WordTiming, WordTimingTracker};

/// Timing of one word that the user reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordReport {
    pub word: String,
    pub begin_timestamp: Option<DateTime<Local>>,
    pub end_timestamp: Option<DateTime<Local>>,
    pub mistake_count: u32,
}

impl WordReport {
    fn from_timing(timing: &WordTiming) -> Self {
        Self {
            word: timing.span.word.clone(),
            begin_timestamp: timing.start_time,
            end_timestamp: timing.end_time,
            mistake_count: timing.mistakes,
        }
    }

    pub fn duration_secs(&self) -> Option<f64> {
        let (begin, end) = (self.begin_timestamp?, self.end_timestamp?);
        Some((end - begin).num_milliseconds() as f64 / 1000.0)
    }

    pub fn wpm(&self) -> Option<f64> {
        let secs = self.duration_secs()?;
        (secs > 0.0).then(|| words_per_minute(self.word.chars().count(), secs))
    }
}

/// Finalized summary of a session, handed to the statistics sink once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub local_start_time: Option<DateTime<Local>>,
    pub local_finish_time: Option<DateTime<Local>>,
    pub paragraph_id: u32,
    pub typed_word_count: usize,
    pub typed_char_count: usize,
    pub wrongful_char_count: usize,
    #[serde(with = "gamemode_code")]
    pub gamemode: Gamemode,
    pub per_word_timing: Vec<WordReport>,
}

impl SessionReport {
    pub fn duration_secs(&self) -> f64 {
        match (self.local_start_time, self.local_finish_time) {
            (Some(start), Some(finish)) => (finish - start).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn wpm(&self) -> f64 {
        words_per_minute(self.typed_char_count, self.duration_secs())
    }

    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.typed_char_count, self.wrongful_char_count)
    }

    /// Per-word speed of every completed word, for charting.
    pub fn word_speeds(&self) -> Vec<TimeSeriesPoint> {
        self.per_word_timing
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.wpm().map(|wpm| TimeSeriesPoint::new((i + 1) as f64, wpm)))
            .collect()
    }
}

mod gamemode_code {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::mode::Gamemode;

    pub fn serialize<S: Serializer>(mode: &Gamemode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(mode.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Gamemode, D::Error> {
        let code = u8::deserialize(d)?;
        Gamemode::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown gamemode code {code}")))
    }
}

/// Assembles the report exactly once per session.
#[derive(Debug, Clone, Default)]
pub struct SessionReportBuilder {
    completed: bool,
}

impl SessionReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns `None` if a report was already produced.
    pub fn finalize(
        &mut self,
        paragraph: &Paragraph,
        gamemode: Gamemode,
        matcher: &InputMatcher,
        tracker: &WordTimingTracker,
        clock: &SessionClock,
    ) -> Option<SessionReport> {
        if self.completed {
            return None;
        }
        self.completed = true;

        let per_word_timing: Vec<WordReport> = tracker
            .words()
            .iter()
            .filter(|w| w.start_time.is_some())
            .map(WordReport::from_timing)
            .collect();

        // recount rather than trust any live counter
        let typed_word_count = per_word_timing
            .iter()
            .filter(|w| w.end_timestamp.is_some())
            .count();
        let wrongful_char_count = tracker.total_mistakes() as usize;

        let report = SessionReport {
            local_start_time: clock.started_at(),
            local_finish_time: clock.stopped_at(),
            paragraph_id: paragraph.id,
            typed_word_count,
            typed_char_count: matcher.cursor(),
            wrongful_char_count,
            gamemode,
            per_word_timing,
        };

        info!(
            paragraph = report.paragraph_id,
            mode = %report.gamemode,
            words = report.typed_word_count,
            chars = report.typed_char_count,
            mistakes = report.wrongful_char_count,
            "session report built"
        );

        Some(report)
    }
}
