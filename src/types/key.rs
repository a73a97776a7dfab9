use crate::types::pitch::{Accidental, Letter, Note, PitchClass, Spelling};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Invalid key \"{0}\"")]
    InvalidKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// A tonic plus a mode. The tonic keeps its written spelling, which decides
/// how accidentals are spelled in chords transposed into this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub tonic: Note,
    pub mode: Mode,
}

impl Default for Key {
    fn default() -> Self {
        Self::new(Note::natural(Letter::C), Mode::Major)
    }
}

// Relative-major tonics whose key signature carries flats.
const FLAT_MAJOR_TONICS: [u8; 5] = [5, 10, 3, 8, 1];

fn signature_spelling(tonic: PitchClass, mode: Mode) -> Spelling {
    let relative_major = match mode {
        Mode::Major => tonic,
        Mode::Minor => tonic.transpose(3),
    };
    if FLAT_MAJOR_TONICS.contains(&relative_major.value()) {
        Spelling::Flats
    } else {
        Spelling::Sharps
    }
}

impl Key {
    pub const fn new(tonic: Note, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    pub fn major(tonic: Note) -> Self {
        Self::new(tonic, Mode::Major)
    }

    pub fn minor(tonic: Note) -> Self {
        Self::new(tonic, Mode::Minor)
    }

    /// Builds a key from a bare pitch class, spelling the tonic by key signature.
    pub fn from_pitch_class(tonic: PitchClass, mode: Mode) -> Self {
        let spelling = signature_spelling(tonic, mode);
        Self::new(Note::from_pitch_class(tonic, spelling), mode)
    }

    pub const fn pitch_class(&self) -> PitchClass {
        self.tonic.pitch_class()
    }

    pub const fn is_minor(&self) -> bool {
        matches!(self.mode, Mode::Minor)
    }

    pub fn spelling(&self) -> Spelling {
        match self.tonic.accidental {
            Accidental::Sharp => Spelling::Sharps,
            Accidental::Flat => Spelling::Flats,
            Accidental::Natural => signature_spelling(self.pitch_class(), self.mode),
        }
    }

    pub fn transpose(&self, semitones: i32) -> Self {
        if semitones.rem_euclid(12) == 0 {
            return *self;
        }
        Self::from_pitch_class(self.pitch_class().transpose(semitones), self.mode)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.tonic),
            Mode::Minor => write!(f, "{}m", self.tonic),
        }
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (tonic, rest) =
            Note::parse_prefix(trimmed).ok_or_else(|| KeyError::InvalidKey(s.to_string()))?;

        let mode = match rest.trim() {
            "" | "M" => Mode::Major,
            "m" | "-" => Mode::Minor,
            other => match other.to_ascii_lowercase().as_str() {
                "maj" | "major" | "ionian" => Mode::Major,
                "min" | "minor" | "aeolian" => Mode::Minor,
                _ => return Err(KeyError::InvalidKey(s.to_string())),
            },
        };

        Ok(Self::new(tonic, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(key("G"), Key::major(Note::natural(Letter::G)));
        assert_eq!(key("Em").mode, Mode::Minor);
        assert_eq!(key("F#m").to_string(), "F#m");
        assert_eq!(key("Ebmin").to_string(), "Ebm");
        assert_eq!(key("C major").to_string(), "C");
        assert_eq!(key(" A minor ").to_string(), "Am");
        assert_eq!(key("Bb").pitch_class().value(), 10);

        assert!("".parse::<Key>().is_err());
        assert!("X".parse::<Key>().is_err());
        assert!("G lydian".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_spelling() {
        for sharp_key in ["C", "G", "D", "A", "E", "B", "F#", "Am", "Em", "Bm", "F#m", "C#m"] {
            assert_eq!(key(sharp_key).spelling(), Spelling::Sharps, "{}", sharp_key);
        }
        for flat_key in ["F", "Bb", "Eb", "Ab", "Db", "Gb", "Dm", "Gm", "Cm", "Fm", "Bbm"] {
            assert_eq!(key(flat_key).spelling(), Spelling::Flats, "{}", flat_key);
        }
    }

    #[test]
    fn test_transpose_key() {
        assert_eq!(key("G").transpose(2).to_string(), "A");
        assert_eq!(key("C").transpose(1).to_string(), "Db");
        assert_eq!(key("C").transpose(6).to_string(), "F#");
        assert_eq!(key("Am").transpose(5).to_string(), "Dm");
        assert_eq!(key("Em").transpose(-2).to_string(), "Dm");
        assert_eq!(key("Gb").transpose(12).to_string(), "Gb");
    }
}
