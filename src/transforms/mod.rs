pub mod nashville;
pub mod transpose;

use crate::chord_line::map_chords;
use crate::document::{Document, Section, SectionLine};
use crate::types::chord::{parse_chord, serialize_chord};
use crate::types::key::Key;
use tracing::debug;

/// How chord symbols are rewritten for display: a shift, optionally followed
/// by conversion to Nashville numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChordTransform {
    pub semitones: i32,
    pub nashville: bool,
    /// Key the song is written in, when known.
    pub source_key: Option<Key>,
}

impl ChordTransform {
    pub fn new(semitones: i32, nashville: bool, source_key: Option<Key>) -> Self {
        Self {
            semitones,
            nashville,
            source_key,
        }
    }

    pub fn for_document(document: &Document, semitones: i32, nashville: bool) -> Self {
        Self::new(semitones, nashville, document.key())
    }

    pub fn is_identity(&self) -> bool {
        transpose::normalize_shift(self.semitones) == 0 && !self.nashville
    }

    pub fn target_key(&self) -> Option<Key> {
        self.source_key.map(|key| key.transpose(self.semitones))
    }

    /// Rewrites one chord symbol. Symbols that do not parse come back as written.
    pub fn apply(&self, symbol: &str) -> String {
        if self.is_identity() {
            return symbol.to_string();
        }

        let chord = match parse_chord(symbol) {
            Ok(chord) => chord,
            Err(e) => {
                debug!("{}, kept as written", e);
                return symbol.to_string();
            }
        };

        let target = self.target_key().unwrap_or_default();
        let shifted = transpose::transpose(&chord, self.semitones, &target);

        if self.nashville {
            nashville::to_nashville(&shifted, &target)
        } else {
            serialize_chord(&shifted, target.spelling())
        }
    }
}

pub fn apply_transforms(document: &Document, transform: &ChordTransform) -> Document {
    if transform.is_identity() {
        return document.clone();
    }

    let mut new_document = document.clone();

    if document.meta("key").is_some() {
        if let Some(target) = transform.target_key() {
            new_document.set_meta("key", target.to_string());
        }
    }

    new_document.sections = document
        .sections
        .iter()
        .map(|section| Section {
            kind: section.kind,
            label: section.label.clone(),
            lines: section
                .lines
                .iter()
                .map(|line| match line {
                    SectionLine::Lyrics(text) => {
                        SectionLine::Lyrics(map_chords(text, |symbol| transform.apply(symbol)))
                    }
                    SectionLine::Comment(text) => SectionLine::Comment(text.clone()),
                })
                .collect(),
        })
        .collect();

    new_document
}
