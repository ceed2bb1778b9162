// Library surface for headless/integration tests and reuse.
// The terminal UI lives in the binary; everything it drives is here.
pub mod app_dirs;
pub mod artifact;
pub mod clock;
pub mod config;
pub mod error;
pub mod matcher;
pub mod mode;
pub mod paragraphs;
pub mod race;
pub mod report;
pub mod report_store;
pub mod runtime;
pub mod segmenter;
pub mod session;
pub mod sound;
pub mod time_series;
pub mod util;
pub mod word_timing;

pub use error::{Result, TypeRaceError};
pub use mode::Gamemode;
pub use session::{Keystroke, SideEffect, TypingSession};
