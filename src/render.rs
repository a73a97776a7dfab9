//! Chord-over-lyrics layout.
//!
//! Each content line becomes a pair of strings: a chord line with every chord
//! starting at the column of the lyric character it belongs to, and the lyric
//! line itself. Sections whose label was already seen are either rendered again
//! or, in compact mode, collapsed to a repeat marker.

use crate::chord_line::split_chords_and_lyrics;
use crate::document::{Document, SectionKind, SectionLine};
use crate::transforms::ChordTransform;
use crate::types::key::Key;
use crate::util::pad;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid chord display mode \"{0}\", expected all, first-only or none")]
pub struct ChordDisplayModeError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordDisplayMode {
    #[default]
    All,
    /// Only the first chord of each line.
    FirstOnly,
    /// Lyrics only.
    None,
}

impl ChordDisplayMode {
    const fn limit(self) -> usize {
        match self {
            ChordDisplayMode::All => usize::MAX,
            ChordDisplayMode::FirstOnly => 1,
            ChordDisplayMode::None => 0,
        }
    }
}

impl fmt::Display for ChordDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChordDisplayMode::All => "all",
            ChordDisplayMode::FirstOnly => "first-only",
            ChordDisplayMode::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ChordDisplayMode {
    type Err = ChordDisplayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ChordDisplayMode::All),
            "first-only" | "first_only" | "first" => Ok(ChordDisplayMode::FirstOnly),
            "none" | "off" => Ok(ChordDisplayMode::None),
            _ => Err(ChordDisplayModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Collapse repeated sections to a marker after their first occurrence.
    pub compact: bool,
    pub transpose_semitones: i32,
    /// Show chords as Nashville numbers (after transposition).
    pub nashville: bool,
    pub chord_display: ChordDisplayMode,
    /// Overrides the key found in the document.
    pub key: Option<Key>,
}

impl RenderOptions {
    pub fn chord_transform(&self, document: &Document) -> ChordTransform {
        ChordTransform::new(
            self.transpose_semitones,
            self.nashville,
            self.key.or_else(|| document.key()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    /// `None` when the line shows no chords.
    pub chords: Option<String>,
    pub lyrics: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub comment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SectionBody {
    Lines(Vec<RenderedLine>),
    Repeat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub kind: SectionKind,
    pub label: String,
    /// Whether a section with this label came earlier.
    pub repeat: bool,
    /// 1-based count of sections with this label so far.
    pub occurrence: usize,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RenderedSong {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub composer: Option<String>,
    /// Key the chords are shown in.
    pub key: Option<String>,
    pub sections: Vec<RenderedSection>,
}

pub fn repeat_marker(label: &str, occurrence: usize) -> String {
    format!("(Repeat {} ×{})", label, occurrence)
}

/// Lays chords out over lyric columns. A chord that would start inside the
/// previous one is written right after it instead.
pub fn layout_chord_line<I, S>(chords: I) -> String
where
    I: IntoIterator<Item = (usize, S)>,
    S: AsRef<str>,
{
    let mut line = String::new();
    let mut column = 0;
    for (position, text) in chords {
        let text = text.as_ref();
        if position > column {
            pad(&mut line, position - column);
            column = position;
        }
        line.push_str(text);
        column += text.chars().count();
    }
    line
}

fn render_line(
    line: &SectionLine,
    transform: &ChordTransform,
    mode: ChordDisplayMode,
) -> RenderedLine {
    match line {
        SectionLine::Comment(text) => RenderedLine {
            chords: None,
            lyrics: text.clone(),
            comment: true,
        },
        SectionLine::Lyrics(text) => {
            let (tokens, lyrics) = split_chords_and_lyrics(text);
            let placed: Vec<(usize, String)> = tokens
                .iter()
                .take(mode.limit())
                .map(|token| (token.position, transform.apply(&token.symbol)))
                .collect();
            let chords = if placed.is_empty() {
                None
            } else {
                Some(layout_chord_line(placed))
            };
            RenderedLine {
                chords,
                lyrics,
                comment: false,
            }
        }
    }
}

pub fn render(document: &Document, options: &RenderOptions) -> RenderedSong {
    let transform = options.chord_transform(document);
    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    let sections = document
        .sections
        .iter()
        .map(|section| {
            let count = occurrences.entry(section.label.as_str()).or_insert(0);
            *count += 1;
            let occurrence = *count;

            let body = if occurrence > 1 && options.compact {
                SectionBody::Repeat(repeat_marker(&section.label, occurrence))
            } else {
                SectionBody::Lines(
                    section
                        .lines
                        .iter()
                        .map(|line| render_line(line, &transform, options.chord_display))
                        .collect(),
                )
            };

            RenderedSection {
                kind: section.kind,
                label: section.label.clone(),
                repeat: occurrence > 1,
                occurrence,
                body,
            }
        })
        .collect();

    RenderedSong {
        id: None,
        title: document.title().map(str::to_string),
        artist: document.artist().map(str::to_string),
        composer: document.composer().map(str::to_string),
        key: transform.target_key().map(|key| key.to_string()),
        sections,
    }
}

impl fmt::Display for RenderedSong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut has_header = false;
        if let Some(title) = &self.title {
            writeln!(f, "{}", title)?;
            has_header = true;
        }
        if let Some(artist) = &self.artist {
            writeln!(f, "by {}", artist)?;
            has_header = true;
        }
        if let Some(composer) = &self.composer {
            writeln!(f, "Composer: {}", composer)?;
            has_header = true;
        }
        if let Some(key) = &self.key {
            writeln!(f, "Key: {}", key)?;
            has_header = true;
        }

        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 || has_header {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.label)?;
            match &section.body {
                SectionBody::Repeat(marker) => writeln!(f, "{}", marker)?,
                SectionBody::Lines(lines) => {
                    for line in lines {
                        if let Some(chords) = &line.chords {
                            writeln!(f, "{}", chords)?;
                        }
                        writeln!(f, "{}", line.lyrics)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_song;
    use crate::util::assert_rendered;
    use pretty_assertions::assert_eq;

    const TEST_SONG: &str = r#"
{meta: title Test Song}
{start_of_verse}
[G]Hello [C]world
{end_of_verse}
"#;

    fn first_line(song: &RenderedSong, section: usize) -> &RenderedLine {
        match &song.sections[section].body {
            SectionBody::Lines(lines) => &lines[0],
            SectionBody::Repeat(marker) => panic!("unexpected repeat marker {}", marker),
        }
    }

    #[test]
    fn test_transposed_example() {
        let options = RenderOptions {
            transpose_semitones: 2,
            ..Default::default()
        };
        let song = render(&parse_song(TEST_SONG), &options);
        let line = first_line(&song, 0);
        let chords = line.chords.as_deref().unwrap();
        assert_eq!(chords, "A     D");
        assert_eq!(chords.find('A'), Some(0));
        assert_eq!(chords.find('D'), Some(6));
        assert_eq!(line.lyrics, "Hello world");
        assert_eq!(song.title.as_deref(), Some("Test Song"));
        assert_eq!(song.key.as_deref(), Some("A"));
    }

    #[test]
    fn test_layout_overlap_and_padding() {
        assert_eq!(layout_chord_line([(0, "G"), (6, "C")]), "G     C");
        assert_eq!(layout_chord_line([(0, "Cmaj7"), (2, "D")]), "Cmaj7D");
        assert_eq!(layout_chord_line([(0, "Am"), (0, "G")]), "AmG");
        assert_eq!(layout_chord_line([(3, "E")]), "   E");
        assert_eq!(layout_chord_line(Vec::<(usize, String)>::new()), "");
    }

    #[test]
    fn test_compact_repeats() {
        let input = r#"
{start_of_chorus}
[C]Sing
{end_of_chorus}
{start_of_verse}
[G]Walk
{end_of_verse}
{start_of_chorus}
[C]Sing
{end_of_chorus}
{start_of_chorus}
[C]Sing
{end_of_chorus}
"#;
        let options = RenderOptions {
            compact: true,
            ..Default::default()
        };
        let song = render(&parse_song(input), &options);
        let bodies: Vec<&SectionBody> = song.sections.iter().map(|s| &s.body).collect();
        assert!(matches!(bodies[0], SectionBody::Lines(_)));
        assert!(matches!(bodies[1], SectionBody::Lines(_)));
        assert_eq!(bodies[2], &SectionBody::Repeat("(Repeat Chorus ×2)".to_string()));
        assert_eq!(bodies[3], &SectionBody::Repeat("(Repeat Chorus ×3)".to_string()));
        assert_eq!(
            song.sections.iter().map(|s| s.repeat).collect::<Vec<_>>(),
            vec![false, false, true, true]
        );

        let full = render(&parse_song(input), &RenderOptions::default());
        assert_eq!(full.sections[3].occurrence, 3);
        assert!(full.sections[3].repeat);
        assert_eq!(first_line(&full, 3), first_line(&full, 0));
    }

    #[test]
    fn test_chord_display_modes() {
        let input = "{start_of_verse}\n[G]Hello [C]big [D]world\nno chords\n{end_of_verse}\n";
        let document = parse_song(input);

        let first_only = RenderOptions {
            chord_display: ChordDisplayMode::FirstOnly,
            ..Default::default()
        };
        let song = render(&document, &first_only);
        assert_eq!(first_line(&song, 0).chords.as_deref(), Some("G"));
        assert_eq!(first_line(&song, 0).lyrics, "Hello big world");

        let none = RenderOptions {
            chord_display: ChordDisplayMode::None,
            ..Default::default()
        };
        let song = render(&document, &none);
        assert_eq!(first_line(&song, 0).chords, None);
        assert_eq!(first_line(&song, 0).lyrics, "Hello big world");

        let song = render(&document, &RenderOptions::default());
        match &song.sections[0].body {
            SectionBody::Lines(lines) => {
                assert_eq!(lines[0].chords.as_deref(), Some("G     C   D"));
                assert_eq!(lines[1].chords, None);
            }
            SectionBody::Repeat(_) => panic!("expected lines"),
        }
    }

    #[test]
    fn test_bad_chords_survive_any_shift() {
        let input = "{start_of_verse}\n[XYZ123]Lyrics\n{end_of_verse}\n";
        for shift in -12..=12 {
            for nashville in [false, true] {
                let options = RenderOptions {
                    transpose_semitones: shift,
                    nashville,
                    ..Default::default()
                };
                let text = render(&parse_song(input), &options).to_string();
                assert!(text.contains("XYZ123"), "shift {}: {}", shift, text);
            }
        }
    }

    #[test]
    fn test_nashville_render() {
        let input =
            "{meta: key G}\n{start_of_verse}\n[G]One [Em]two [C]three [D7]four\n{end_of_verse}\n";
        let options = RenderOptions {
            nashville: true,
            transpose_semitones: 5,
            ..Default::default()
        };
        let song = render(&parse_song(input), &options);
        assert_eq!(first_line(&song, 0).chords.as_deref(), Some("I   vi  IV    V7"));
        assert_eq!(song.key.as_deref(), Some("C"));
    }

    #[test]
    fn test_key_override() {
        let document = parse_song("{start_of_verse}\n[C]xxx [G]yyy\n{end_of_verse}\n");
        let inferred = RenderOptions {
            nashville: true,
            ..Default::default()
        };
        let song = render(&document, &inferred);
        assert_eq!(first_line(&song, 0).chords.as_deref(), Some("I   V"));

        let overridden = RenderOptions {
            key: Some("F".parse().unwrap()),
            ..inferred
        };
        let song = render(&document, &overridden);
        assert_eq!(first_line(&song, 0).chords.as_deref(), Some("V   II"));
        assert_eq!(song.key.as_deref(), Some("F"));

        let shifted = RenderOptions {
            transpose_semitones: 3,
            nashville: false,
            ..overridden
        };
        let song = render(&document, &shifted);
        assert_eq!(first_line(&song, 0).chords.as_deref(), Some("Eb  Bb"));
        assert_eq!(song.key.as_deref(), Some("Ab"));
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let song = render(&parse_song("{meta: title Nothing}\n"), &RenderOptions::default());
        assert!(song.sections.is_empty());
        assert_eq!(song.key, None);
    }

    #[test]
    fn test_text_output() {
        let input = r#"
{meta: title Test Song}
{meta: artist Nobody}
{start_of_verse}
[G]Hello [C]world
{end_of_verse}
{start_of_chorus}
{comment: all together}
[D]La la [G]la
{end_of_chorus}
{start_of_chorus}
[D]La la [G]la
{end_of_chorus}
"#;
        let options = RenderOptions {
            compact: true,
            ..Default::default()
        };
        let expected = r#"
Test Song
by Nobody
Key: G

[Verse]
G     C
Hello world

[Chorus]
D     G
La la la

[Chorus]
(Repeat Chorus ×2)
"#;
        assert_rendered(input, &options, expected);
    }

    #[test]
    fn test_chord_display_mode_parse() {
        assert_eq!("all".parse::<ChordDisplayMode>().unwrap(), ChordDisplayMode::All);
        assert_eq!(
            "First-Only".parse::<ChordDisplayMode>().unwrap(),
            ChordDisplayMode::FirstOnly
        );
        assert_eq!("none".parse::<ChordDisplayMode>().unwrap(), ChordDisplayMode::None);
        assert!("some".parse::<ChordDisplayMode>().is_err());
        assert_eq!(ChordDisplayMode::FirstOnly.to_string(), "first-only");
    }
}
