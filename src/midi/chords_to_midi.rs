use crate::chord_line::split_chords_and_lyrics;
use crate::document::{Document, SectionLine};
use crate::render::RenderOptions;
use crate::transforms::ChordTransform;
use crate::types::chord::parse_chord;
use anyhow::{Result, bail};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tracing::debug;

use super::voicing::chord_intervals;

const PPQN: u16 = 480;
const DEFAULT_BPM: f64 = 120.0;
const MICROS_PER_MINUTE: f64 = 60_000_000.0;
// Largest value a MIDI tempo event holds (24 bits).
const MAX_MICROS_PER_BEAT: f64 = 16_777_215.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTrackSettings {
    /// MIDI note the root pitch class is counted up from (C3).
    pub base_note: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl Default for ChordTrackSettings {
    fn default() -> Self {
        Self {
            base_note: 48,
            velocity: 80,
            channel: 0,
        }
    }
}

enum Step {
    Marker(String),
    Chord(Vec<u8>),
}

/// Tempo from the `tempo` metadata, falling back to 120 when it is missing or
/// does not fit a MIDI tempo event.
fn tempo_bpm(document: &Document) -> f64 {
    document
        .meta("tempo")
        .and_then(|tempo| tempo.trim().parse::<f64>().ok())
        .filter(|bpm| {
            let micros = MICROS_PER_MINUTE / bpm;
            bpm.is_finite() && *bpm > 0.0 && (1.0..=MAX_MICROS_PER_BEAT).contains(&micros)
        })
        .unwrap_or(DEFAULT_BPM)
}

/// `(numerator, denominator)` from a `time` value such as `3/4`.
fn time_signature(document: &Document) -> (u8, u8) {
    document
        .meta("time")
        .and_then(|time| {
            let (numerator, denominator) = time.trim().split_once('/')?;
            let numerator: u8 = numerator.trim().parse().ok()?;
            let denominator: u8 = denominator.trim().parse().ok()?;
            (numerator > 0 && denominator.is_power_of_two()).then_some((numerator, denominator))
        })
        .unwrap_or((4, 4))
}

fn chord_notes(symbol: &str, settings: &ChordTrackSettings) -> Result<Option<Vec<u8>>> {
    let chord = match parse_chord(symbol) {
        Ok(chord) => chord,
        Err(e) => {
            debug!("{}, no notes played", e);
            return Ok(None);
        }
    };

    let root = settings.base_note as u32 + chord.root.pitch_class().value() as u32;
    let mut notes = Vec::new();
    if let Some(bass) = chord.bass {
        // one octave below the chord
        let bass_note = settings.base_note as u32 + bass.pitch_class().value() as u32;
        notes.push(bass_note.saturating_sub(12));
    }
    notes.extend(
        chord_intervals(&chord.quality)
            .into_iter()
            .map(|interval| root + interval as u32),
    );

    let mut midi_notes = Vec::with_capacity(notes.len());
    for note in notes {
        if note > 127 {
            bail!("Note {} of chord {} out of range for MIDI", note, symbol);
        }
        midi_notes.push(note as u8);
    }
    Ok(Some(midi_notes))
}

fn collect_steps(
    document: &Document,
    transform: &ChordTransform,
    settings: &ChordTrackSettings,
) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for section in &document.sections {
        steps.push(Step::Marker(section.label.clone()));
        for line in &section.lines {
            let SectionLine::Lyrics(text) = line else {
                continue;
            };
            let (chords, _) = split_chords_and_lyrics(text);
            for token in chords {
                if let Some(notes) = chord_notes(&transform.apply(&token.symbol), settings)? {
                    steps.push(Step::Chord(notes));
                }
            }
        }
    }
    Ok(steps)
}

/// Builds a single-track MIDI file with one block chord per chord marker.
///
/// Chords are transposed the way `options` asks, sections are played in
/// order without compaction, and each chord lasts one bar of the song's
/// `time` signature.
pub fn convert_song_to_midi(
    document: &Document,
    options: &RenderOptions,
    settings: &ChordTrackSettings,
) -> Result<Vec<u8>> {
    if settings.channel > 15 {
        bail!("Channel {} out of range for MIDI", settings.channel);
    }
    if settings.velocity > 127 {
        bail!("Velocity {} out of range for MIDI", settings.velocity);
    }

    let transform = ChordTransform {
        nashville: false,
        ..options.chord_transform(document)
    };
    let steps = collect_steps(document, &transform, settings)?;
    let title = document.title().unwrap_or_default();

    let bpm = tempo_bpm(document);
    let (numerator, denominator) = time_signature(document);
    let chord_ticks = numerator as u32 * PPQN as u32 * 4 / denominator as u32;
    let channel = midly::num::u4::new(settings.channel);
    let velocity = midly::num::u7::new(settings.velocity);

    let mut track_events = Vec::new();
    if !title.is_empty() {
        track_events.push(TrackEvent {
            delta: midly::num::u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(title.as_bytes())),
        });
    }
    track_events.push(TrackEvent {
        delta: midly::num::u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(midly::num::u24::new(
            (MICROS_PER_MINUTE / bpm) as u32,
        ))),
    });
    track_events.push(TrackEvent {
        delta: midly::num::u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            numerator,
            denominator.trailing_zeros() as u8,
            24,
            8,
        )),
    });

    let mut chord_count = 0;
    for step in &steps {
        match step {
            Step::Marker(label) => track_events.push(TrackEvent {
                delta: midly::num::u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Marker(label.as_bytes())),
            }),
            Step::Chord(notes) => {
                chord_count += 1;
                for &note in notes {
                    track_events.push(TrackEvent {
                        delta: midly::num::u28::new(0),
                        kind: TrackEventKind::Midi {
                            channel,
                            message: MidiMessage::NoteOn {
                                key: midly::num::u7::new(note),
                                vel: velocity,
                            },
                        },
                    });
                }
                for (i, &note) in notes.iter().enumerate() {
                    let delta = if i == 0 { chord_ticks } else { 0 };
                    track_events.push(TrackEvent {
                        delta: midly::num::u28::new(delta),
                        kind: TrackEventKind::Midi {
                            channel,
                            message: MidiMessage::NoteOff {
                                key: midly::num::u7::new(note),
                                vel: midly::num::u7::new(0),
                            },
                        },
                    });
                }
            }
        }
    }

    track_events.push(TrackEvent {
        delta: midly::num::u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: midly::Header {
            format: midly::Format::SingleTrack,
            timing: Timing::Metrical(midly::num::u15::new(PPQN)),
        },
        tracks: vec![track_events],
    };

    let mut buffer = Vec::new();
    smf.write(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to write MIDI: {}", e))?;

    debug!(
        "Wrote {} chord(s) at {} bpm ({} bytes)",
        chord_count,
        bpm,
        buffer.len()
    );
    Ok(buffer)
}
