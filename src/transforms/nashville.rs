use crate::document::Document;
use crate::transforms::{ChordTransform, apply_transforms};
use crate::types::chord::ParsedChord;
use crate::types::key::Key;
use crate::types::pitch::PitchClass;

// Semitones above the tonic, measured against the major scale whatever the mode.
const NUMERALS: [&str; 12] = [
    "I", "bII", "II", "bIII", "III", "IV", "#IV/bV", "V", "bVI", "VI", "bVII", "VII",
];

pub fn degree_numeral(pitch_class: PitchClass, key: &Key) -> &'static str {
    NUMERALS[key.pitch_class().interval_to(pitch_class) as usize]
}

fn strip_minor_marker(quality: &str) -> &str {
    quality
        .strip_prefix("min")
        .or_else(|| quality.strip_prefix('m'))
        .unwrap_or(quality)
}

/// Converts a chord to a Nashville number relative to `key`.
///
/// Minor chords get a lowercase numeral in place of their `m`; the rest of the
/// quality follows unchanged. A bass note becomes its own numeral after `/`.
pub fn to_nashville(chord: &ParsedChord, key: &Key) -> String {
    let numeral = degree_numeral(chord.root.pitch_class(), key);

    let mut result = if chord.is_minor() {
        let mut lower = numeral.to_lowercase();
        lower.push_str(strip_minor_marker(&chord.quality));
        lower
    } else {
        let mut upper = numeral.to_string();
        upper.push_str(&chord.quality);
        upper
    };

    if let Some(bass) = chord.bass {
        result.push('/');
        result.push_str(degree_numeral(bass.pitch_class(), key));
    }

    result
}

/// Rewrites every chord in the document as a Nashville number of its key.
pub fn transform(document: &Document) -> Document {
    let transform = ChordTransform::for_document(document, 0, true);
    apply_transforms(document, &transform)
}
