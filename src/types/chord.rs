use crate::types::pitch::{Note, Spelling};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    #[error("Unrecognized chord \"{0}\"")]
    Unrecognized(String),
}

/// A chord symbol split into root, quality and optional bass.
///
/// The quality is everything between the root and the slash, kept verbatim:
/// `m7b5`, `maj9`, `sus4`, `add9`, `6/9` and the like are never interpreted,
/// so they survive transposition unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedChord {
    pub root: Note,
    pub quality: String,
    pub bass: Option<Note>,
}

/// `m` not followed by `aj`: `m`, `m7`, `min`, `m7b5` but not `maj7`.
pub fn is_minor_quality(quality: &str) -> bool {
    match quality.strip_prefix('m') {
        Some(rest) => !rest.starts_with("aj"),
        None => false,
    }
}

impl ParsedChord {
    pub fn new(root: Note, quality: impl Into<String>, bass: Option<Note>) -> Self {
        Self {
            root,
            quality: quality.into(),
            bass,
        }
    }

    pub fn is_minor(&self) -> bool {
        is_minor_quality(&self.quality)
    }

    pub fn respell(&self, spelling: Spelling) -> Self {
        Self {
            root: self.root.respell(spelling),
            quality: self.quality.clone(),
            bass: self.bass.map(|bass| bass.respell(spelling)),
        }
    }
}

pub fn parse_chord(symbol: &str) -> Result<ParsedChord, ChordError> {
    let (root, rest) = Note::parse_prefix(symbol.trim())
        .ok_or_else(|| ChordError::Unrecognized(symbol.to_string()))?;

    // Slash suffixes that are not a pitch (`6/9`) stay part of the quality.
    let (quality, bass) = match rest.rsplit_once('/') {
        Some((quality, bass)) => match bass.parse::<Note>() {
            Ok(bass) => (quality, Some(bass)),
            Err(_) => (rest, None),
        },
        None => (rest, None),
    };

    Ok(ParsedChord::new(root, quality, bass))
}

/// Writes `chord` back as a symbol, spelling root and bass with `spelling`.
pub fn serialize_chord(chord: &ParsedChord, spelling: Spelling) -> String {
    chord.respell(spelling).to_string()
}

impl fmt::Display for ParsedChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality)?;
        if let Some(bass) = &self.bass {
            write!(f, "/{}", bass)?;
        }
        Ok(())
    }
}

impl FromStr for ParsedChord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}
