use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    #[error("Invalid note name \"{0}\"")]
    InvalidNote(String),
}

/// One of the twelve pitch classes, `0` being C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const fn new(value: i32) -> Self {
        Self(value.rem_euclid(12) as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones.rem_euclid(12))
    }

    /// Upward distance in semitones from `self` to `other`, in `0..12`.
    pub const fn interval_to(self, other: PitchClass) -> u8 {
        Self::new(other.0 as i32 - self.0 as i32).0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    pub const fn natural_pitch_class(self) -> PitchClass {
        let value = match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        };
        PitchClass::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    pub const fn offset(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// Which accidental to write for the five black-key pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Spelling {
    #[default]
    Sharps,
    Flats,
}

/// A pitch class as written: a letter plus an accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub letter: Letter,
    pub accidental: Accidental,
}

const SHARP_NAMES: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

const FLAT_NAMES: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::D, Accidental::Flat),
    (Letter::D, Accidental::Natural),
    (Letter::E, Accidental::Flat),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::G, Accidental::Flat),
    (Letter::G, Accidental::Natural),
    (Letter::A, Accidental::Flat),
    (Letter::A, Accidental::Natural),
    (Letter::B, Accidental::Flat),
    (Letter::B, Accidental::Natural),
];

impl Note {
    pub const fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    pub const fn natural(letter: Letter) -> Self {
        Self::new(letter, Accidental::Natural)
    }

    pub const fn pitch_class(self) -> PitchClass {
        self.letter
            .natural_pitch_class()
            .transpose(self.accidental.offset())
    }

    pub fn from_pitch_class(pitch_class: PitchClass, spelling: Spelling) -> Self {
        let names = match spelling {
            Spelling::Sharps => &SHARP_NAMES,
            Spelling::Flats => &FLAT_NAMES,
        };
        let (letter, accidental) = names[pitch_class.value() as usize];
        Self::new(letter, accidental)
    }

    pub fn transpose(self, semitones: i32, spelling: Spelling) -> Self {
        Self::from_pitch_class(self.pitch_class().transpose(semitones), spelling)
    }

    pub fn respell(self, spelling: Spelling) -> Self {
        self.transpose(0, spelling)
    }

    /// Reads a note name at the start of `text` and returns it with the unread rest.
    ///
    /// Accepts `#`/`b` as well as `♯`/`♭`.
    pub fn parse_prefix(text: &str) -> Option<(Self, &str)> {
        let mut chars = text.chars();
        let letter = Letter::from_char(chars.next()?)?;
        let rest = chars.as_str();

        let mut after = rest.chars();
        let (accidental, rest) = match after.next() {
            Some('#') | Some('♯') => (Accidental::Sharp, after.as_str()),
            Some('b') | Some('♭') => (Accidental::Flat, after.as_str()),
            _ => (Accidental::Natural, rest),
        };

        Some((Self::new(letter, accidental), rest))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.symbol())
    }
}

impl FromStr for Note {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Note::parse_prefix(s.trim()) {
            Some((note, "")) => Ok(note),
            _ => Err(PitchError::InvalidNote(s.to_string())),
        }
    }
}
