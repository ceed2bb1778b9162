use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::matcher::{InputMatcher, Outcome, Transition};
use crate::sound::SoundKind;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gamemode {
    #[default]
    Standard,
    Short,
    Hardcore,
}

impl Gamemode {
    pub const ALL: [Gamemode; 3] = [Gamemode::Standard, Gamemode::Short, Gamemode::Hardcore];

    /// Integer code stored alongside reports.
    pub fn code(self) -> u8 {
        match self {
            Gamemode::Standard => 0,
            Gamemode::Short => 1,
            Gamemode::Hardcore => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    pub fn next(self) -> Self {
        match self {
            Gamemode::Standard => Gamemode::Short,
            Gamemode::Short => Gamemode::Hardcore,
            Gamemode::Hardcore => Gamemode::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FinishReason {
    #[strum(to_string = "completed")]
    Completed,
    #[strum(to_string = "hardcore mistake")]
    HardcoreMistake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Finish(FinishReason),
}

/// Mode-specific policy applied around each matcher transition.
#[derive(Debug, Clone, Copy)]
pub struct ModeGate {
    mode: Gamemode,
}

impl ModeGate {
    pub fn new(mode: Gamemode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Gamemode {
        self.mode
    }

    /// Decide whether the session ends after `transition`.
    ///
    /// Reads the matcher after the transition was applied, so a completing
    /// keystroke sees its own effect on the error state.
    pub fn judge(&self, transition: &Transition, matcher: &InputMatcher) -> Verdict {
        let Transition::Advanced { outcome, .. } = *transition else {
            return Verdict::Continue;
        };

        match (self.mode, outcome) {
            (Gamemode::Hardcore, Outcome::Incorrect) => {
                Verdict::Finish(FinishReason::HardcoreMistake)
            }
            (Gamemode::Standard | Gamemode::Short | Gamemode::Hardcore, Outcome::Correct)
                if matcher.is_at_end() && !matcher.has_unresolved_error() =>
            {
                Verdict::Finish(FinishReason::Completed)
            }
            (Gamemode::Standard | Gamemode::Short | Gamemode::Hardcore, _) => Verdict::Continue,
        }
    }

    pub fn sound_for(&self, transition: &Transition) -> Option<SoundKind> {
        let Transition::Advanced {
            outcome,
            in_error_run,
            ..
        } = *transition
        else {
            return None;
        };

        match (self.mode, outcome) {
            (Gamemode::Hardcore, Outcome::Incorrect) => Some(SoundKind::WrongHardcore),
            (Gamemode::Standard | Gamemode::Short, Outcome::Incorrect) => {
                Some(SoundKind::WrongNormal)
            }
            (_, Outcome::Correct) if in_error_run => Some(SoundKind::WrongNormal),
            (Gamemode::Hardcore, Outcome::Correct) => Some(SoundKind::TypingHardcore),
            (Gamemode::Standard | Gamemode::Short, Outcome::Correct) => None,
        }
    }
}
