use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, TypeRaceError};
use crate::mode::Gamemode;
use crate::report::{SessionReport, WordReport};
use crate::util::mean;

/// Opaque identifier handed back by a statistics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination for finished session reports.
pub trait StatisticsSink {
    fn submit(&mut self, report: &SessionReport) -> Result<SessionId>;
}

/// Accepts reports without keeping them.
#[derive(Debug, Default)]
pub struct DiscardSink {
    submitted: i64,
}

impl StatisticsSink for DiscardSink {
    fn submit(&mut self, report: &SessionReport) -> Result<SessionId> {
        self.submitted += 1;
        debug!(paragraph = report.paragraph_id, "report discarded");
        Ok(SessionId(self.submitted))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub session_id: SessionId,
    pub finished_at: Option<DateTime<Local>>,
    pub gamemode: Gamemode,
    pub wpm: f64,
    pub accuracy: f64,
}

/// Best sessions for a mode plus averages across all of its sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub gamemode: Gamemode,
    pub entries: Vec<LeaderboardEntry>,
    pub average_wpm: Option<f64>,
    pub average_accuracy: Option<f64>,
}

/// SQLite-backed history of finished sessions.
#[derive(Debug)]
pub struct ReportStore {
    conn: Connection,
}

fn to_timestamp(value: Option<DateTime<Local>>) -> Option<String> {
    value.map(|t| t.to_rfc3339())
}

fn from_timestamp(value: Option<String>) -> Result<Option<DateTime<Local>>> {
    value
        .map(|s| Ok(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Local)))
        .transpose()
}

fn mode_from_code(code: u8) -> Result<Gamemode> {
    Gamemode::from_code(code).ok_or(TypeRaceError::UnknownGamemode(code))
}

impl ReportStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                local_start_time TEXT,
                local_finish_time TEXT,
                paragraph_id INTEGER NOT NULL,
                typed_word_count INTEGER NOT NULL,
                typed_char_count INTEGER NOT NULL,
                wrongful_char_count INTEGER NOT NULL,
                gamemode INTEGER NOT NULL,
                wpm REAL NOT NULL,
                accuracy REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS word_timings (
                session_id INTEGER NOT NULL REFERENCES sessions(id),
                position INTEGER NOT NULL,
                word TEXT NOT NULL,
                begin_timestamp TEXT,
                end_timestamp TEXT,
                mistake_count INTEGER NOT NULL,
                PRIMARY KEY (session_id, position)
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_gamemode_wpm ON sessions(gamemode, wpm);
            "#,
        )?;

        Ok(Self { conn })
    }

    pub fn load_report(&self, id: SessionId) -> Result<Option<SessionReport>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT local_start_time, local_finish_time, paragraph_id, typed_word_count,
                       typed_char_count, wrongful_char_count, gamemode
                FROM sessions WHERE id = ?1
                "#,
                [id.0],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, usize>(3)?,
                        row.get::<_, usize>(4)?,
                        row.get::<_, usize>(5)?,
                        row.get::<_, u8>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((start, finish, paragraph_id, words, chars, wrong, mode)) = row else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            r#"
            SELECT word, begin_timestamp, end_timestamp, mistake_count
            FROM word_timings WHERE session_id = ?1
            ORDER BY position
            "#,
        )?;
        let raw_words = stmt
            .query_map([id.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, u32>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut per_word_timing = Vec::with_capacity(raw_words.len());
        for (word, begin, end, mistakes) in raw_words {
            per_word_timing.push(WordReport {
                word,
                begin_timestamp: from_timestamp(begin)?,
                end_timestamp: from_timestamp(end)?,
                mistake_count: mistakes,
            });
        }

        Ok(Some(SessionReport {
            local_start_time: from_timestamp(start)?,
            local_finish_time: from_timestamp(finish)?,
            paragraph_id,
            typed_word_count: words,
            typed_char_count: chars,
            wrongful_char_count: wrong,
            gamemode: mode_from_code(mode)?,
            per_word_timing,
        }))
    }

    /// Top `limit` sessions of `mode` by speed, best first.
    pub fn leaderboard(&self, mode: Gamemode, limit: usize) -> Result<Leaderboard> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, local_finish_time, gamemode, wpm, accuracy
            FROM sessions WHERE gamemode = ?1
            ORDER BY wpm DESC, accuracy DESC, id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([mode.code()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let wpms: Vec<f64> = rows.iter().map(|r| r.3).collect();
        let accuracies: Vec<f64> = rows.iter().map(|r| r.4).collect();

        let mut entries = Vec::new();
        for (id, finished, code, wpm, accuracy) in rows.into_iter().take(limit) {
            entries.push(LeaderboardEntry {
                session_id: SessionId(id),
                finished_at: from_timestamp(finished)?,
                gamemode: mode_from_code(code)?,
                wpm,
                accuracy,
            });
        }

        Ok(Leaderboard {
            gamemode: mode,
            entries,
            average_wpm: mean(&wpms),
            average_accuracy: mean(&accuracies),
        })
    }
}

impl StatisticsSink for ReportStore {
    fn submit(&mut self, report: &SessionReport) -> Result<SessionId> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO sessions
            (local_start_time, local_finish_time, paragraph_id, typed_word_count,
             typed_char_count, wrongful_char_count, gamemode, wpm, accuracy)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                to_timestamp(report.local_start_time),
                to_timestamp(report.local_finish_time),
                report.paragraph_id,
                report.typed_word_count,
                report.typed_char_count,
                report.wrongful_char_count,
                report.gamemode.code(),
                report.wpm(),
                report.accuracy(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (position, word) in report.per_word_timing.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO word_timings
                (session_id, position, word, begin_timestamp, end_timestamp, mistake_count)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id,
                    position,
                    word.word,
                    to_timestamp(word.begin_timestamp),
                    to_timestamp(word.end_timestamp),
                    word.mistake_count,
                ],
            )?;
        }

        tx.commit()?;
        info!(session = id, "report stored");
        Ok(SessionId(id))
    }
}
