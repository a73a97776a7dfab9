//! Close-position voicings for block chords.

use crate::types::chord::is_minor_quality;

/// Semitone offsets above the root for a chord quality.
///
/// Qualities are matched by their parts, so `m7b5`, `7sus4` and `maj9` are
/// voiced without listing every spelling. Anything unrecognised is a major
/// triad.
pub fn chord_intervals(quality: &str) -> Vec<u8> {
    let q = quality.trim();
    let lower = q.to_ascii_lowercase();
    let major_seventh = q.contains("maj") || q.contains('M') || q.contains('Δ');
    let diminished = lower.contains("dim") || q.contains('°');
    let half_diminished = q.contains('ø') || lower.contains("m7b5");

    let third = if lower.contains("sus2") {
        2
    } else if lower.contains("sus") {
        5
    } else if diminished || half_diminished || is_minor_quality(q) || q.starts_with('-') {
        3
    } else {
        4
    };

    let fifth = if diminished || half_diminished || lower.contains("b5") {
        6
    } else if lower.contains("aug") || q.starts_with('+') || lower.contains("#5") {
        8
    } else {
        7
    };

    let mut intervals = vec![0, third, fifth];

    let sixth = q.contains('6') && !lower.contains("b6");
    if sixth {
        intervals.push(9);
    }

    let extended = ["9", "11", "13"].iter().any(|ext| q.contains(ext)) && !lower.contains("add");
    if q.contains('7') || (extended && !sixth) {
        let seventh = if diminished && !half_diminished {
            9
        } else if major_seventh {
            11
        } else {
            10
        };
        if !intervals.contains(&seventh) {
            intervals.push(seventh);
        }
    }

    if q.contains('9') {
        intervals.push(14);
    }

    intervals
}
