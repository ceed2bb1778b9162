use thiserror::Error;

use crate::mode::Gamemode;
use crate::report_store::SessionId;

/// Errors surfaced by the collaborators around a typing session.
///
/// None of these are fatal to a session: the caller keeps the current
/// session interactive and turns the error into a notice.
#[derive(Debug, Error)]
pub enum TypeRaceError {
    #[error("paragraph data error: {0}")]
    Paragraphs(String),

    #[error("no paragraphs available for {0} mode")]
    EmptyPool(Gamemode),

    #[error("unknown gamemode code {0}")]
    UnknownGamemode(u8),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("timestamp error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}

pub type Result<T> = std::result::Result<T, TypeRaceError>;
