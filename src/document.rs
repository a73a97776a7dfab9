use crate::chord_line::split_chords_and_lyrics;
use crate::types::chord::parse_chord;
use crate::types::key::{Key, Mode};
use crate::util::capitalize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Verse,
    Chorus,
    Bridge,
}

impl SectionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "verse" => Some(SectionKind::Verse),
            "chorus" => Some(SectionKind::Chorus),
            "bridge" => Some(SectionKind::Bridge),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
        }
    }

    pub fn default_label(self) -> String {
        capitalize(self.name())
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionLine {
    /// Lyrics with inline `[chord]` markers, as written.
    Lyrics(String),
    /// Text of a `{comment: ...}` directive.
    Comment(String),
}

impl SectionLine {
    pub fn text(&self) -> &str {
        match self {
            SectionLine::Lyrics(text) | SectionLine::Comment(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub label: String,
    pub lines: Vec<SectionLine>,
}

impl Section {
    pub fn new(kind: SectionKind, label: Option<String>) -> Self {
        Self {
            kind,
            label: label.unwrap_or_else(|| kind.default_label()),
            lines: Vec::new(),
        }
    }

    pub fn has_default_label(&self) -> bool {
        self.label == self.kind.default_label()
    }

    pub fn lyric_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            SectionLine::Lyrics(text) => Some(text.as_str()),
            SectionLine::Comment(_) => None,
        })
    }
}

/// A parsed song: metadata plus its sections in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub metadata: BTreeMap<String, String>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) {
        self.metadata.insert(key.to_lowercase(), value.into());
    }

    /// Looks up a metadata value; `key` is case-insensitive.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.meta("title")
    }

    pub fn artist(&self) -> Option<&str> {
        self.meta("artist")
    }

    pub fn composer(&self) -> Option<&str> {
        self.meta("composer").or_else(|| self.meta("writer"))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Key from the `key` metadata, else guessed from the first chord.
    pub fn key(&self) -> Option<Key> {
        self.meta("key")
            .and_then(|value| value.parse().ok())
            .or_else(|| self.infer_key())
    }

    /// Takes the first chord that parses as the tonic; a minor first chord
    /// gives a minor key.
    pub fn infer_key(&self) -> Option<Key> {
        self.sections
            .iter()
            .flat_map(|section| section.lyric_lines())
            .flat_map(|line| split_chords_and_lyrics(line).0)
            .find_map(|token| parse_chord(&token.symbol).ok())
            .map(|chord| {
                let mode = if chord.is_minor() {
                    Mode::Minor
                } else {
                    Mode::Major
                };
                Key::new(chord.root, mode)
            })
    }
}

/// Writes the document back as ChordPro markup.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.metadata {
            writeln!(f, "{{meta: {} {}}}", key, value)?;
        }

        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 || !self.metadata.is_empty() {
                writeln!(f)?;
            }
            if section.has_default_label() {
                writeln!(f, "{{start_of_{}}}", section.kind)?;
            } else {
                writeln!(f, "{{start_of_{}: {}}}", section.kind, section.label)?;
            }
            for line in &section.lines {
                match line {
                    SectionLine::Lyrics(text) => writeln!(f, "{}", text)?,
                    SectionLine::Comment(text) => writeln!(f, "{{comment: {}}}", text)?,
                }
            }
            writeln!(f, "{{end_of_{}}}", section.kind)?;
        }
        Ok(())
    }
}
