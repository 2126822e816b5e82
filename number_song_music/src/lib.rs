// Number Song: a piece composed from the arithmetic of its own beat counter.
//
// Ten voices walk the same integer beat sequence. Each voice has a rule that
// looks at number-theoretic properties of the beat (primality, digit sums
// and digital roots in various bases, palindromes, happy numbers, divisors)
// and decides whether to play, what pitch and length to use, and how long
// to rest afterwards. The result is a Csound score; a MIDI rendering is
// available for quick listening.
//
// Architecture:
// - pitch.rs: Csound "octave.note" pitch value with normalizing arithmetic
// - field.rs: Extra per-note score fields and their default/override rule
// - instrument.rs: One voice's configuration, busy guard, and note timeline
// - orchestra.rs: The ten voice roles and their built-in instrument table
// - composer.rs: `VoiceRule` trait and the beat loop that drives all voices
// - rules.rs: The ten rule state machines
// - score.rs: Score preamble and full score text
// - midi.rs: MIDI file output from a composed orchestra
// - synth.rs: Synthesis engine boundary and the csound command-line driver
// - config.rs: JSON-loadable generator configuration
// - error.rs: Crate error type
//
// Number-theory helpers come from the `number_song_heuristics` crate. The
// whole pipeline is deterministic: the same config always yields the same
// score text.

pub mod composer;
pub mod config;
pub mod error;
pub mod field;
pub mod instrument;
pub mod midi;
pub mod orchestra;
pub mod pitch;
pub mod rules;
pub mod score;
pub mod synth;

pub use error::{Result, ScoreError};
