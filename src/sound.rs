use std::io::{self, Write};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SoundKind {
    WrongNormal,
    WrongHardcore,
    TypingHardcore,
}

/// Fire-and-forget audio feedback. Implementations must never block.
pub trait SoundNotifier {
    fn play(&self, kind: SoundKind);
}

/// Rings the terminal bell for mistakes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl SoundNotifier for TerminalBell {
    fn play(&self, kind: SoundKind) {
        match kind {
            SoundKind::WrongNormal | SoundKind::WrongHardcore => {
                let mut out = io::stdout();
                // best effort, a failed bell is not worth surfacing
                let _ = out.write_all(b"\x07").and_then(|_| out.flush());
            }
            SoundKind::TypingHardcore => trace!("typing click has no terminal equivalent"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundNotifier for Silent {
    fn play(&self, _kind: SoundKind) {}
}
