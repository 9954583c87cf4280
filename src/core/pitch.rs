//! Pitch types for staffdrill.
//!
//! A pitch is a natural note name, an octave, and the clef it is read in.
//! Pitches are compared by height through their ordering value
//! (`octave * 12 + semitone offset`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StaffError};

/// Staff context a pitch is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clef {
    /// G clef. Bottom line is E4.
    Treble,
    /// F clef. Bottom line is G2.
    Bass,
}

impl Clef {
    /// Get all clef variants.
    pub fn all() -> &'static [Clef] {
        &[Clef::Treble, Clef::Bass]
    }

    /// Get the name used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
        }
    }

    /// Diatonic number of the bottom staff line.
    fn bottom_line(&self) -> i32 {
        match self {
            Clef::Treble => diatonic_number(Letter::E, 4),
            Clef::Bass => diatonic_number(Letter::G, 2),
        }
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Clef {
    type Err = StaffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "treble" => Ok(Clef::Treble),
            "bass" => Ok(Clef::Bass),
            other => Err(StaffError::config(format!(
                "unknown clef '{}' (expected treble or bass)",
                other
            ))),
        }
    }
}

/// Natural note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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
    /// Get all letters in scale order starting from C.
    pub fn all() -> &'static [Letter] {
        &[
            Letter::C,
            Letter::D,
            Letter::E,
            Letter::F,
            Letter::G,
            Letter::A,
            Letter::B,
        ]
    }

    /// Semitone offset above C within the octave.
    pub fn semitone(&self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Position within the octave counted in scale steps (C = 0, B = 6).
    pub fn step(&self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Parse an uppercase or lowercase letter.
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
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

    fn as_char(&self) -> char {
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
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Letter {
    type Err = StaffError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::from_char(c).ok_or_else(|| StaffError::invalid_pitch(s)),
            _ => Err(StaffError::invalid_pitch(s)),
        }
    }
}

fn diatonic_number(letter: Letter, octave: i32) -> i32 {
    octave.saturating_mul(7).saturating_add(letter.step())
}

/// A natural pitch as read on a specific clef.
///
/// Equality covers letter, octave, and clef: E4 on the treble staff and E4 on
/// the bass staff are different items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    /// Note letter.
    pub letter: Letter,
    /// Scientific octave number (middle C is C4).
    pub octave: i32,
    /// Clef the pitch is read in.
    pub clef: Clef,
}

impl Pitch {
    /// Create a new pitch.
    pub fn new(letter: Letter, octave: i32, clef: Clef) -> Self {
        Self {
            letter,
            octave,
            clef,
        }
    }

    /// Parse a label such as `C4` for the given clef.
    pub fn parse(label: &str, clef: Clef) -> Result<Self> {
        let (letter, octave) = parse_label(label)?;
        Ok(Self::new(letter, octave, clef))
    }

    /// Height used for ordering and range checks.
    pub fn value(&self) -> i32 {
        self.octave
            .saturating_mul(12)
            .saturating_add(self.letter.semitone())
    }

    /// Label without the clef, e.g. `C4`.
    pub fn label(&self) -> String {
        format!("{}{}", self.letter, self.octave)
    }

    /// Scale steps above the bottom line of this pitch's staff.
    ///
    /// Even steps sit on lines and odd steps in spaces. The five staff lines
    /// are steps 0, 2, 4, 6, 8; negative steps and steps above 8 need ledger
    /// lines.
    pub fn staff_step(&self) -> i32 {
        diatonic_number(self.letter, self.octave).saturating_sub(self.clef.bottom_line())
    }

    /// Whether a submitted letter names this pitch.
    ///
    /// Only the letter is compared. Octave and clef are taken from the target
    /// itself, so they always match.
    pub fn matches_letter(&self, letter: Letter) -> bool {
        *self == Pitch::new(letter, self.octave, self.clef)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({})", self.letter, self.octave, self.clef)
    }
}

/// Highest octave a label may name.
pub const MAX_OCTAVE: i32 = 9;

/// Parse a pitch label of the form `<letter><octave>`, e.g. `E2` or `C8`.
///
/// The letter must be an uppercase `A`-`G` and the octave a run of ASCII
/// digits from 0 to [`MAX_OCTAVE`]. Anything else is an
/// [`StaffError::InvalidPitch`].
pub fn parse_label(label: &str) -> Result<(Letter, i32)> {
    let mut chars = label.chars();
    let letter = chars
        .next()
        .filter(|c| c.is_ascii_uppercase())
        .and_then(Letter::from_char)
        .ok_or_else(|| StaffError::invalid_pitch(label))?;

    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StaffError::invalid_pitch(label));
    }
    let octave = digits
        .parse::<i32>()
        .ok()
        .filter(|octave| (0..=MAX_OCTAVE).contains(octave))
        .ok_or_else(|| StaffError::invalid_pitch(label))?;

    Ok((letter, octave))
}

/// Inclusive pitch range for one clef, stored as labels.
///
/// Labels are kept as written so that a config file with a typo survives a
/// round trip; they are parsed when the range is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    /// Clef the range applies to.
    pub clef: Clef,
    /// Lowest included pitch label.
    pub start: String,
    /// Highest included pitch label.
    pub end: String,
}

impl PitchRange {
    /// Create a new range.
    pub fn new(clef: Clef, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            clef,
            start: start.into(),
            end: end.into(),
        }
    }

    /// Ordering values of both bounds.
    pub fn bounds(&self) -> Result<(i32, i32)> {
        let start = Pitch::parse(&self.start, self.clef)?;
        let end = Pitch::parse(&self.end, self.clef)?;
        Ok((start.value(), end.value()))
    }

    /// Check that both labels parse.
    pub fn validate(&self) -> Result<()> {
        self.bounds().map(|_| ())
    }
}

impl fmt::Display for PitchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
