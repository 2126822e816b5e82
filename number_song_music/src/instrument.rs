// A single voice: configuration plus an append-only note timeline.
//
// Each `Instrument` knows how its notes are laid out on a Csound score line
// (a field name -> column mapping), which orchestra instrument to reference
// for short (<= 1 beat) and long notes, and the default pitch, amplitude,
// and extra fields every note starts from.
//
// Notes are added through `add_note` with a `NoteRequest`. Pitch and
// amplitude in a request are deltas from the voice defaults. Only whole
// semitones and whole decibels count as deltas: a rule may attach a
// computed loudness level to a note, and that level leaves the voice's
// default amplitude in place. A voice is
// monophonic by default: it is "busy" until the end of its last accepted
// note, and a request starting before that point is silently dropped unless
// it opts out of the guard (chords and overlapping pedal tones do).
//
// Accepted notes are frozen into `NoteEvent`s with every declared field
// resolved, so rendering is a pure read and can be repeated freely.
//
// Lengths keep track of how they were produced. A counted length (a tally
// of beats) renders as an integer, "24"; a measured length renders with a
// decimal point even when whole, "1.0" or "0.5". Csound reads both forms
// the same way.

use crate::error::Result;
use crate::field::{FieldValue, resolve_field};
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

pub const FIELD_INSTRUMENT: &str = "instrument";
pub const FIELD_START: &str = "start";
pub const FIELD_DURATION: &str = "duration";
pub const FIELD_AMPLITUDE: &str = "amplitude";
pub const FIELD_PITCH: &str = "pitch";
pub const FIELD_COMMENT: &str = "comment";

/// Fields every note has regardless of voice configuration.
pub const CORE_FIELDS: [&str; 5] = [
    FIELD_INSTRUMENT,
    FIELD_START,
    FIELD_DURATION,
    FIELD_AMPLITUDE,
    FIELD_PITCH,
];

/// Static description of a voice, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Field name -> score column. Columns are emitted in ascending order.
    pub mapping: BTreeMap<String, u32>,
    /// Orchestra instrument for notes of at most one beat (e.g. "i3").
    pub short: String,
    /// Orchestra instrument for notes longer than one beat.
    pub long: String,
    pub default_pitch: Pitch,
    /// Base amplitude in decibels; note amplitudes are deltas from this.
    pub default_amplitude: f64,
    /// Defaults for extra fields. Entries absent from `mapping` are kept
    /// but never rendered.
    #[serde(default)]
    pub defaults: BTreeMap<String, FieldValue>,
}

impl InstrumentConfig {
    /// A config with the five core columns plus a trailing comment column.
    pub fn new(short: &str, long: &str, default_pitch: Pitch, default_amplitude: f64) -> Self {
        let mut mapping: BTreeMap<String, u32> = CORE_FIELDS
            .iter()
            .zip(1..)
            .map(|(name, column)| (name.to_string(), column))
            .collect();
        mapping.insert(FIELD_COMMENT.to_string(), 999);
        let mut defaults = BTreeMap::new();
        defaults.insert(FIELD_COMMENT.to_string(), FieldValue::from(""));
        InstrumentConfig {
            mapping,
            short: short.to_string(),
            long: long.to_string(),
            default_pitch,
            default_amplitude,
            defaults,
        }
    }

    /// Declare an extra numeric field at `column` with a default value.
    pub fn with_field(mut self, name: &str, column: u32, default: f64) -> Self {
        self.mapping.insert(name.to_string(), column);
        self.defaults.insert(name.to_string(), FieldValue::Number(default));
        self
    }

    /// Add a default for a field that is not rendered.
    pub fn with_default(mut self, name: &str, default: f64) -> Self {
        self.defaults.insert(name.to_string(), FieldValue::Number(default));
        self
    }

    /// Field names in output order (ascending column, then name).
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<(&String, &u32)> = self.mapping.iter().collect();
        cols.sort_by_key(|&(_, column)| *column);
        cols.into_iter().map(|(name, _)| name.clone()).collect()
    }
}

/// How long a note lasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteLength {
    /// A whole number of beats counted by a rule.
    Beats(u64),
    /// A measured length in beats, possibly fractional.
    Exact(f64),
}

impl NoteLength {
    pub fn as_beats(self) -> f64 {
        match self {
            NoteLength::Beats(n) => n as f64,
            NoteLength::Exact(x) => x,
        }
    }
}

impl fmt::Display for NoteLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NoteLength::Beats(n) => write!(f, "{n}"),
            NoteLength::Exact(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            NoteLength::Exact(x) => write!(f, "{x}"),
        }
    }
}

/// Amplitude change attached to a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gain {
    /// Whole decibels added to the voice's default amplitude.
    Decibels(i32),
    /// A computed loudness level. Not a decibel offset, so the note keeps
    /// the voice's default amplitude.
    Level(f64),
}

/// A request to add one note to a voice. Built with chained setters.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRequest {
    pub start: f64,
    pub length: NoteLength,
    /// Semitone offset from the voice's default pitch.
    pub pitch: Option<i32>,
    pub amplitude: Option<Gain>,
    /// Accept the note even if the voice is still sounding.
    pub ignore_busy: bool,
    pub fields: BTreeMap<String, FieldValue>,
}

impl NoteRequest {
    /// A one-beat note at `start` with default pitch and amplitude.
    pub fn at(start: f64) -> Self {
        NoteRequest {
            start,
            length: NoteLength::Exact(1.0),
            pitch: None,
            amplitude: None,
            ignore_busy: false,
            fields: BTreeMap::new(),
        }
    }

    /// A measured length in beats.
    pub fn length(mut self, length: f64) -> Self {
        self.length = NoteLength::Exact(length);
        self
    }

    /// A counted length in whole beats.
    pub fn beats(mut self, beats: u64) -> Self {
        self.length = NoteLength::Beats(beats);
        self
    }

    pub fn pitch(mut self, semitones: i32) -> Self {
        self.pitch = Some(semitones);
        self
    }

    pub fn amplitude(mut self, decibels: i32) -> Self {
        self.amplitude = Some(Gain::Decibels(decibels));
        self
    }

    pub fn level(mut self, level: f64) -> Self {
        self.amplitude = Some(Gain::Level(level));
        self
    }

    pub fn ignore_busy(mut self) -> Self {
        self.ignore_busy = true;
        self
    }

    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn comment(self, text: impl Into<String>) -> Self {
        self.field(FIELD_COMMENT, text.into())
    }
}

/// An accepted note with every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub instrument: String,
    pub start: f64,
    pub duration: NoteLength,
    pub amplitude: f64,
    pub pitch: Pitch,
    pub extras: BTreeMap<String, FieldValue>,
}

impl NoteEvent {
    /// The rendered text of a named field. Unknown fields render as 0.
    pub fn field_text(&self, name: &str) -> String {
        match name {
            FIELD_INSTRUMENT => self.instrument.clone(),
            FIELD_START => self.start.to_string(),
            FIELD_DURATION => self.duration.to_string(),
            FIELD_AMPLITUDE => self.amplitude.to_string(),
            FIELD_PITCH => self.pitch.to_string(),
            _ => self
                .extras
                .get(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| FieldValue::zero().to_string()),
        }
    }
}

/// A voice with its timeline.
#[derive(Debug, Clone)]
pub struct Instrument {
    config: InstrumentConfig,
    columns: Vec<String>,
    notes: Vec<NoteEvent>,
    busy_until: f64,
}

impl Instrument {
    pub fn new(config: InstrumentConfig) -> Self {
        let columns = config.columns();
        Instrument {
            config,
            columns,
            notes: Vec::new(),
            busy_until: 0.0,
        }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Beat before which non-overriding requests are dropped.
    pub fn busy_until(&self) -> f64 {
        self.busy_until
    }

    /// Add a note. Returns `Ok(false)` if the busy guard dropped it.
    pub fn add_note(&mut self, request: NoteRequest) -> Result<bool> {
        if !request.ignore_busy && request.start < self.busy_until {
            trace!(
                start = request.start,
                busy_until = self.busy_until,
                "note dropped by busy guard"
            );
            return Ok(false);
        }

        let length = request.length.as_beats();
        let instrument = if length <= 1.0 {
            self.config.short.clone()
        } else {
            self.config.long.clone()
        };
        let pitch = match request.pitch {
            Some(delta) => self.config.default_pitch.add_semitones(delta),
            None => self.config.default_pitch,
        };
        let amplitude = match request.amplitude {
            Some(Gain::Decibels(delta)) => self.config.default_amplitude + delta as f64,
            Some(Gain::Level(_)) | None => self.config.default_amplitude,
        };

        let mut extras = BTreeMap::new();
        for name in &self.columns {
            if CORE_FIELDS.contains(&name.as_str()) {
                continue;
            }
            let value = resolve_field(request.fields.get(name), self.config.defaults.get(name))?;
            extras.insert(name.clone(), value);
        }

        self.notes.push(NoteEvent {
            instrument,
            start: request.start,
            duration: request.length,
            amplitude,
            pitch,
            extras,
        });
        self.busy_until = request.start + length;
        Ok(true)
    }

    /// One tab-separated score line per note, in timeline order.
    ///
    /// Lazy; each call starts a fresh pass over the timeline.
    pub fn render_timeline(&self) -> impl Iterator<Item = String> + '_ {
        self.notes.iter().map(|note| {
            self.columns
                .iter()
                .map(|name| note.field_text(name))
                .collect::<Vec<_>>()
                .join("\t")
        })
    }

    /// The whole timeline as newline-separated score lines.
    pub fn render(&self) -> String {
        self.render_timeline().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> InstrumentConfig {
        InstrumentConfig::new("i3", "i3", Pitch::new(8, 0), 81.0)
            .with_field("attack", 6, 0.03)
            .with_field("release", 7, 0.3)
    }

    #[test]
    fn test_busy_guard() {
        let mut inst = Instrument::new(quick_config());
        assert!(inst.add_note(NoteRequest::at(5.0).length(3.0)).unwrap());
        assert!(!inst.add_note(NoteRequest::at(6.0)).unwrap());
        assert!(inst.add_note(NoteRequest::at(8.0)).unwrap());
        assert_eq!(inst.notes().len(), 2);
        assert_eq!(inst.busy_until(), 9.0);
    }

    #[test]
    fn test_ignore_busy_still_advances_marker() {
        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(0.0).length(4.0)).unwrap();
        assert!(inst.add_note(NoteRequest::at(1.0).ignore_busy()).unwrap());
        assert_eq!(inst.busy_until(), 2.0);
        assert!(inst.add_note(NoteRequest::at(2.0)).unwrap());
    }

    #[test]
    fn test_short_and_long_instruments() {
        let config = InstrumentConfig::new("i10", "i11", Pitch::new(6, 9), 86.0);
        let mut inst = Instrument::new(config);
        inst.add_note(NoteRequest::at(0.0)).unwrap();
        inst.add_note(NoteRequest::at(1.0).length(1.5)).unwrap();
        assert_eq!(inst.notes()[0].instrument, "i10");
        assert_eq!(inst.notes()[1].instrument, "i11");
    }

    #[test]
    fn test_pitch_and_amplitude_deltas() {
        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(0.0).pitch(14).amplitude(-5)).unwrap();
        inst.add_note(NoteRequest::at(1.0)).unwrap();
        assert_eq!(inst.notes()[0].pitch.to_string(), "9.02");
        assert_eq!(inst.notes()[0].amplitude, 76.0);
        assert_eq!(inst.notes()[1].pitch.to_string(), "8.00");
        assert_eq!(inst.notes()[1].amplitude, 81.0);
    }

    #[test]
    fn test_field_resolution_and_render() {
        let mut config = quick_config();
        config.mapping.insert("pan".to_string(), 8);
        let mut inst = Instrument::new(config);
        inst.add_note(
            NoteRequest::at(21.0)
                .length(0.5)
                .pitch(2)
                .field("release", 0.2)
                .comment("; root(21 - 10 = 11) = 2"),
        )
        .unwrap();
        let lines: Vec<String> = inst.render_timeline().collect();
        assert_eq!(
            lines,
            vec!["i3\t21\t0.5\t81\t8.02\t0.03\t0.5\t0\t; root(21 - 10 = 11) = 2".to_string()]
        );
    }

    #[test]
    fn test_length_rendering() {
        assert_eq!(NoteLength::Exact(1.0).to_string(), "1.0");
        assert_eq!(NoteLength::Exact(0.5).to_string(), "0.5");
        assert_eq!(NoteLength::Beats(24).to_string(), "24");
        assert_eq!(NoteLength::Beats(1).to_string(), "1");

        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(3.0)).unwrap();
        inst.add_note(NoteRequest::at(4.0).beats(2)).unwrap();
        let lines: Vec<String> = inst.render_timeline().collect();
        assert!(lines[0].starts_with("i3\t3\t1.0\t81\t"));
        assert!(lines[1].starts_with("i3\t4\t2\t81\t"));
        assert_eq!(inst.busy_until(), 6.0);
    }

    #[test]
    fn test_level_keeps_default_amplitude() {
        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(0.0).level(6.181818)).unwrap();
        inst.add_note(NoteRequest::at(1.0).level(7.0)).unwrap();
        inst.add_note(NoteRequest::at(2.0).amplitude(7)).unwrap();
        let amps: Vec<f64> = inst.notes().iter().map(|n| n.amplitude).collect();
        assert_eq!(amps, vec![81.0, 81.0, 88.0]);
        assert!(inst.render().lines().next().unwrap().contains("\t81\t"));
    }

    #[test]
    fn test_unmapped_override_ignored() {
        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(0.0).field("reverb", 3.0)).unwrap();
        assert!(!inst.notes()[0].extras.contains_key("reverb"));
        assert_eq!(inst.render().split('\t').count(), 8);
    }

    #[test]
    fn test_mismatched_override_is_error() {
        let mut inst = Instrument::new(quick_config());
        let err = inst.add_note(NoteRequest::at(0.0).field("attack", "soft"));
        assert!(err.is_err());
        assert!(inst.notes().is_empty());
        assert_eq!(inst.busy_until(), 0.0);
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut inst = Instrument::new(quick_config());
        inst.add_note(NoteRequest::at(3.0)).unwrap();
        inst.add_note(NoteRequest::at(4.0).pitch(-1)).unwrap();
        let first = inst.render();
        let second = inst.render();
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 2);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = quick_config().with_default("reverb", 1.5);
        let json = serde_json::to_string(&config).unwrap();
        let back: InstrumentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
