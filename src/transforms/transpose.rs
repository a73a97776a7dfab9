use crate::document::Document;
use crate::transforms::{ChordTransform, apply_transforms};
use crate::types::chord::ParsedChord;
use crate::types::key::Key;

/// Semitones to shift by when moving from `from` to `to`, always in `0..12`.
pub fn semitone_shift(from: &Key, to: &Key) -> i32 {
    from.pitch_class().interval_to(to.pitch_class()) as i32
}

pub fn normalize_shift(semitones: i32) -> i32 {
    semitones.rem_euclid(12)
}

/// Shifts root and bass by `semitones`, spelling them for `target_key`.
/// The quality is never touched.
pub fn transpose(chord: &ParsedChord, semitones: i32, target_key: &Key) -> ParsedChord {
    let spelling = target_key.spelling();
    ParsedChord {
        root: chord.root.transpose(semitones, spelling),
        quality: chord.quality.clone(),
        bass: chord.bass.map(|bass| bass.transpose(semitones, spelling)),
    }
}

/// Rewrites every chord in the document, and its `key` metadata if present.
pub fn transform(document: &Document, amount: i32) -> Document {
    if normalize_shift(amount) == 0 {
        return document.clone();
    }
    let transform = ChordTransform::for_document(document, amount, false);
    apply_transforms(document, &transform)
}
