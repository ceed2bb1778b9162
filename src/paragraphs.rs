use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;
use tracing::debug;

use crate::error::{Result, TypeRaceError};
use crate::mode::Gamemode;

static PARAGRAPH_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/paragraphs");

/// Text to be typed. Immutable once fetched.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub id: u32,
    pub text: String,
}

impl Paragraph {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Source of paragraphs for new sessions.
pub trait ParagraphProvider {
    fn fetch(&mut self, mode: Gamemode) -> Result<Paragraph>;
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct ParagraphFile {
    name: String,
    paragraphs: Vec<Paragraph>,
}

fn read_paragraph_file(file_name: &str) -> Result<Vec<Paragraph>> {
    let file = PARAGRAPH_DIR
        .get_file(file_name)
        .ok_or_else(|| TypeRaceError::Paragraphs(format!("{file_name} not found")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| TypeRaceError::Paragraphs(format!("{file_name} is not UTF-8")))?;

    let parsed: ParagraphFile = from_str(file_as_str)?;
    Ok(parsed.paragraphs)
}

/// Paragraphs compiled into the binary, split into standard and short pools.
#[derive(Debug, Clone)]
pub struct BuiltinParagraphs {
    standard: Vec<Paragraph>,
    short: Vec<Paragraph>,
    last_id: Option<u32>,
}

impl BuiltinParagraphs {
    pub fn load() -> Result<Self> {
        Ok(Self::from_pools(
            read_paragraph_file("standard.json")?,
            read_paragraph_file("short.json")?,
        ))
    }

    pub fn from_pools(standard: Vec<Paragraph>, short: Vec<Paragraph>) -> Self {
        Self {
            standard,
            short,
            last_id: None,
        }
    }

    fn pool(&self, mode: Gamemode) -> &[Paragraph] {
        match mode {
            Gamemode::Short => &self.short,
            Gamemode::Standard | Gamemode::Hardcore => &self.standard,
        }
    }
}

impl ParagraphProvider for BuiltinParagraphs {
    fn fetch(&mut self, mode: Gamemode) -> Result<Paragraph> {
        let last_id = self.last_id;
        let pool = self.pool(mode);
        let candidates: Vec<&Paragraph> = if pool.len() > 1 {
            pool.iter().filter(|p| Some(p.id) != last_id).collect()
        } else {
            pool.iter().collect()
        };

        let paragraph = candidates
            .choose(&mut rand::thread_rng())
            .map(|p| (*p).clone())
            .ok_or(TypeRaceError::EmptyPool(mode))?;

        debug!(id = paragraph.id, %mode, "paragraph selected");
        self.last_id = Some(paragraph.id);
        Ok(paragraph)
    }
}

/// Always serves the same user-supplied text.
#[derive(Debug, Clone)]
pub struct FixedParagraph {
    paragraph: Paragraph,
}

impl FixedParagraph {
    /// Runs of whitespace collapse to one space; tabs and newlines can't be typed.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref().split_whitespace().join(" ");
        Self {
            paragraph: Paragraph::new(0, text),
        }
    }
}

impl ParagraphProvider for FixedParagraph {
    fn fetch(&mut self, _mode: Gamemode) -> Result<Paragraph> {
        Ok(self.paragraph.clone())
    }
}
