use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TypeRaceError};
use crate::report_store::{ReportStore, SessionId};
use crate::util::{mean, std_dev};

/// Produces a derived artifact for a stored session.
pub trait ArtifactGenerator {
    /// Returns a short human readable message describing the artifact.
    fn generate(&mut self, session: SessionId) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct WordRow<'a> {
    position: usize,
    word: &'a str,
    begin: Option<String>,
    end: Option<String>,
    duration_ms: Option<i64>,
    wpm: Option<f64>,
    mistakes: u32,
}

/// Writes per-word timings of a stored session to `session-<id>.csv`.
#[derive(Debug, Clone)]
pub struct CsvArtifactGenerator {
    db_path: PathBuf,
    out_dir: PathBuf,
}

impl CsvArtifactGenerator {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(db_path: P, out_dir: Q) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifact_path(&self, session: SessionId) -> PathBuf {
        self.out_dir.join(format!("session-{session}.csv"))
    }
}

impl ArtifactGenerator for CsvArtifactGenerator {
    fn generate(&mut self, session: SessionId) -> Result<String> {
        let store = ReportStore::open(&self.db_path)?;
        let report = store
            .load_report(session)?
            .ok_or(TypeRaceError::SessionNotFound(session))?;

        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.artifact_path(session);
        let mut writer = csv::Writer::from_path(&path)?;

        for (position, word) in report.per_word_timing.iter().enumerate() {
            writer.serialize(WordRow {
                position: position + 1,
                word: &word.word,
                begin: word.begin_timestamp.map(|t| t.to_rfc3339()),
                end: word.end_timestamp.map(|t| t.to_rfc3339()),
                duration_ms: word
                    .begin_timestamp
                    .zip(word.end_timestamp)
                    .map(|(b, e)| (e - b).num_milliseconds()),
                wpm: word.wpm(),
                mistakes: word.mistake_count,
            })?;
        }
        writer.flush()?;

        let speeds: Vec<f64> = report.word_speeds().iter().map(|p| p.wpm).collect();
        let message = match (mean(&speeds), std_dev(&speeds)) {
            (Some(avg), Some(sd)) => format!(
                "word timings saved to {} ({avg:.0} wpm per word, sd {sd:.1})",
                path.display()
            ),
            _ => format!("word timings saved to {}", path.display()),
        };
        info!(session = %session, path = %path.display(), "artifact written");
        Ok(message)
    }
}
