mod chords_to_midi;
pub mod voicing;

pub use chords_to_midi::{ChordTrackSettings, convert_song_to_midi};
