// Csound pitch-class values ("octave.note").
//
// A `Pitch` is an (octave, semitone) pair where the semitone is always kept
// in [0, 12): any overflow or underflow is carried into the octave using
// floored division and Euclidean remainder, so `7.-1` style intermediate
// values land on `6.11`, not `7.-1` or `6.-1`.
//
// Pitches are immutable. Arithmetic returns a new, normalized value; adding
// a plain integer moves by semitones, adding another pitch adds octaves and
// semitones component-wise before normalizing.
//
// Rendered as unpadded octave, a dot, and a two-digit semitone ("8.06"),
// which is the `pch` notation Csound orchestras read in their pitch field.

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SEMITONES_PER_OCTAVE: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    octave: i32,
    note: i32,
}

#[allow(clippy::should_implement_trait)]
impl Pitch {
    /// Build a pitch from raw components, normalizing the semitone.
    pub fn new(octave: i32, note: i32) -> Self {
        Pitch {
            octave: octave + note.div_euclid(SEMITONES_PER_OCTAVE),
            note: note.rem_euclid(SEMITONES_PER_OCTAVE),
        }
    }

    /// Build a pitch from a slice that must hold exactly (octave, note).
    pub fn from_parts(parts: &[i32]) -> Result<Self> {
        match parts {
            [octave, note] => Ok(Pitch::new(*octave, *note)),
            _ => Err(ScoreError::InvalidArgument(format!(
                "pitch needs exactly two components (octave, note), got {}",
                parts.len()
            ))),
        }
    }

    pub fn octave(self) -> i32 {
        self.octave
    }

    /// Semitone within the octave, always in [0, 12).
    pub fn note(self) -> i32 {
        self.note
    }

    pub fn add(self, other: Pitch) -> Pitch {
        Pitch::new(self.octave + other.octave, self.note + other.note)
    }

    pub fn subtract(self, other: Pitch) -> Pitch {
        Pitch::new(self.octave - other.octave, self.note - other.note)
    }

    pub fn add_semitones(self, semitones: i32) -> Pitch {
        Pitch::new(self.octave, self.note + semitones)
    }

    pub fn subtract_semitones(self, semitones: i32) -> Pitch {
        Pitch::new(self.octave, self.note - semitones)
    }

    /// MIDI key number, with Csound's 8.00 mapped to middle C (60).
    /// Clamped to the MIDI range.
    pub fn midi_key(self) -> u8 {
        let key = (self.octave - 3) * SEMITONES_PER_OCTAVE + self.note;
        key.clamp(0, 127) as u8
    }
}

impl FromStr for Pitch {
    type Err = ScoreError;

    /// Parse "octave.note", both parts unsigned decimal integers.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || {
            ScoreError::InvalidArgument(format!(
                "pitch must look like \"octave.note\" (e.g. \"8.01\"), got {s:?}"
            ))
        };
        let (octave, note) = s.split_once('.').ok_or_else(malformed)?;
        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(octave) || !is_digits(note) {
            return Err(malformed());
        }
        let octave: i32 = octave.parse().map_err(|_| malformed())?;
        let note: i32 = note.parse().map_err(|_| malformed())?;
        Ok(Pitch::new(octave, note))
    }
}

impl TryFrom<String> for Pitch {
    type Error = ScoreError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Pitch> for String {
    fn from(p: Pitch) -> String {
        p.to_string()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.octave, self.note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let p: Pitch = "8.06".parse().unwrap();
        assert_eq!((p.octave(), p.note()), (8, 6));
        assert_eq!(p.to_string(), "8.06");
        assert_eq!("5.7".parse::<Pitch>().unwrap().to_string(), "5.07");
        // semitone overflow in the literal is carried
        assert_eq!("8.13".parse::<Pitch>().unwrap().to_string(), "9.01");
    }

    #[test]
    fn test_malformed_text_rejected() {
        for bad in ["", "8", "8.", ".06", "8x06", "a.01", "8.0.1", "-1.02", "8.-1"] {
            let err = bad.parse::<Pitch>().unwrap_err();
            assert!(matches!(err, ScoreError::InvalidArgument(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_from_parts_arity() {
        assert_eq!(Pitch::from_parts(&[7, 14]).unwrap(), Pitch::new(8, 2));
        assert!(matches!(Pitch::from_parts(&[7]), Err(ScoreError::InvalidArgument(_))));
        assert!(matches!(Pitch::from_parts(&[7, 1, 2]), Err(ScoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_negative_semitones_borrow() {
        let p = Pitch::new(7, 0).add_semitones(-4);
        assert_eq!(p.to_string(), "6.08");
        assert_eq!(Pitch::new(7, 0).subtract_semitones(13).to_string(), "5.11");
        assert_eq!(Pitch::new(0, -1).to_string(), "-1.11");
    }

    #[test]
    fn test_normalization_matches_floor_div_mod() {
        for octave in -3..=10 {
            for note in -100..=100 {
                for k in [-37, -12, -1, 0, 1, 5, 11, 12, 29] {
                    let p = Pitch::new(octave, note).add_semitones(k);
                    let sum = note + k;
                    assert_eq!(p.note(), sum.rem_euclid(12));
                    assert_eq!(p.octave(), octave + sum.div_euclid(12));
                    assert!((0..12).contains(&p.note()));
                }
            }
        }
    }

    #[test]
    fn test_pitch_arithmetic() {
        let a = Pitch::new(8, 6);
        let b = Pitch::new(1, 9);
        assert_eq!(a.add(b), b.add(a));
        assert_eq!(a.add(b).to_string(), "10.03");
        assert_eq!(a.add(b).subtract(b), a);
        let c = Pitch::new(-2, 7);
        assert_eq!(a.add(b).add(c), a.add(b.add(c)));
        assert_eq!(a.add_semitones(5).subtract_semitones(5), a);
    }

    #[test]
    fn test_midi_key() {
        assert_eq!(Pitch::new(8, 0).midi_key(), 60);
        assert_eq!(Pitch::new(8, 9).midi_key(), 69);
        assert_eq!(Pitch::new(5, 7).midi_key(), 31);
        assert_eq!(Pitch::new(-5, 0).midi_key(), 0);
        assert_eq!(Pitch::new(20, 0).midi_key(), 127);
    }

    #[test]
    fn test_serde_as_text() {
        let json = serde_json::to_string(&Pitch::new(6, 9)).unwrap();
        assert_eq!(json, "\"6.09\"");
        let back: Pitch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Pitch::new(6, 9));
        assert!(serde_json::from_str::<Pitch>("\"nope\"").is_err());
    }
}
