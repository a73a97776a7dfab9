//! chordsheet - ChordPro songbook library
//!
//! Parses chord-annotated song markup, transposes chords with key-aware
//! spelling, converts them to Nashville numbers and lays them out above the
//! lyrics they belong to.

pub mod chord_line;
pub mod document;
pub mod index;
pub mod line_parser;
pub mod parser;
pub mod render;
pub mod settings;
pub mod transforms;
pub mod types;
pub mod util;

#[cfg(feature = "midi")]
pub mod midi;

// Re-export commonly used types
pub use chord_line::{ChordToken, join_chords_and_lyrics, split_chords_and_lyrics};
pub use document::{Document, Section, SectionKind, SectionLine};
pub use index::{SongIndex, SongRecord};
pub use parser::{
    Diagnostic, ParseOutput, ParserOptions, SongParser, parse_song, parse_song_with_diagnostics,
    parse_song_with_options,
};
pub use render::{
    ChordDisplayMode, RenderOptions, RenderedLine, RenderedSection, RenderedSong, SectionBody,
    render,
};
pub use settings::Settings;
pub use transforms::nashville::to_nashville;
pub use transforms::transpose::{semitone_shift, transpose};
pub use transforms::{ChordTransform, apply_transforms};
pub use types::chord::{ChordError, ParsedChord, parse_chord, serialize_chord};
pub use types::key::{Key, KeyError, Mode};
pub use types::pitch::{Accidental, Letter, Note, PitchClass, PitchError, Spelling};
