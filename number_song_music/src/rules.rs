// The ten voice rules.
//
// Each struct keeps its tunable constants as public fields (with `Default`
// carrying the values the piece was written with) and its running state as
// private fields. State only moves forward: cooldowns count down one beat
// at a time, runs extend or close, queues drain.
//
// Pitches are semitone offsets from the voice's default pitch; amplitudes
// are whole-decibel offsets from the voice's default amplitude. The ascent
// and churchbell voices compute a loudness level instead, which rides on
// the request but leaves the voice default in place. Every note carries
// a "; ..." comment recording how it was derived, which ends up as the last
// column of its score line.

use crate::composer::{BeatWindows, VoiceRule};
use crate::instrument::NoteRequest;
use crate::orchestra::VoiceRole;
use number_song_heuristics::{
    NumberOracle, Radix, count_digit, digit_sum, digital_root, divisors, highest_digit, is_happy,
    last_nonzero_digit, lowest_digit, ones_in_binary, palindrome_bases, sum_of_divisors,
    to_radix_string,
};
use std::collections::VecDeque;

/// All rules in evaluation order.
pub fn default_rules() -> Vec<Box<dyn VoiceRule>> {
    vec![
        Box::new(BassRule::default()),
        Box::new(QuickRule::default()),
        Box::new(LongRule::default()),
        Box::new(HighRule::default()),
        Box::new(ArpeggioRule::default()),
        Box::new(AscentRule::default()),
        Box::new(ErraticRule::default()),
        Box::new(BuzzyRule::default()),
        Box::new(ChurchbellRule::default()),
        Box::new(HappyRule::default()),
    ]
}

/// Count down a cooldown. Returns true if the voice is still resting.
fn cooling(cooldown: &mut u64) -> bool {
    if *cooldown > 0 {
        *cooldown -= 1;
        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Bass
// ---------------------------------------------------------------------------

/// Plays every beat, climbing a semitone each time and snapping back to the
/// bottom (with an accent) on every prime beat.
#[derive(Debug, Clone)]
pub struct BassRule {
    pub windows: BeatWindows,
    pub prime_pitch: i32,
    pub prime_accent: i32,
    pitch: i32,
}

impl Default for BassRule {
    fn default() -> Self {
        BassRule {
            windows: BeatWindows::from_start(0),
            prime_pitch: 1,
            prime_accent: 10,
            pitch: 1,
        }
    }
}

impl VoiceRule for BassRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Bass
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        let accent = if oracle.is_prime(beat) {
            self.pitch = self.prime_pitch;
            self.prime_accent
        } else {
            self.pitch += 1;
            0
        };
        vec![
            NoteRequest::at(beat as f64)
                .pitch(self.pitch)
                .amplitude(accent)
                .comment(format!("; bass_pitch = {}", self.pitch)),
        ]
    }
}

// ---------------------------------------------------------------------------
// Quick
// ---------------------------------------------------------------------------

/// Doubled staccato notes pitched by the digital root of
/// `beat - sum_of_prime_factors(beat)`. When the divisor sum is a Fibonacci
/// number the voice rests for `digital_root(beat)` beats instead.
#[derive(Debug, Clone)]
pub struct QuickRule {
    pub windows: BeatWindows,
    pub note_length: f64,
    cooldown: u64,
}

impl Default for QuickRule {
    fn default() -> Self {
        QuickRule {
            windows: BeatWindows::single(21, 797),
            note_length: 0.5,
            cooldown: 0,
        }
    }
}

impl VoiceRule for QuickRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Quick
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if cooling(&mut self.cooldown) {
            return Vec::new();
        }
        if oracle.is_fibonacci(sum_of_divisors(beat)) {
            self.cooldown = digital_root(beat, Radix::DECIMAL);
            return Vec::new();
        }
        let factor_sum = oracle.sum_of_prime_factors(beat);
        let difference = beat.saturating_sub(factor_sum);
        let pitch = digital_root(difference, Radix::DECIMAL) as i32;
        let start = beat as f64;
        vec![
            NoteRequest::at(start)
                .length(self.note_length)
                .pitch(pitch)
                .comment(format!(
                    "; root({beat} - {factor_sum} = {difference}) = {pitch}"
                )),
            NoteRequest::at(start + self.note_length)
                .length(self.note_length)
                .pitch(pitch)
                .comment("; \"  \"  \"  \"  \" "),
        ]
    }
}

// ---------------------------------------------------------------------------
// Long
// ---------------------------------------------------------------------------

/// Long tones over a low pedal. Counts the bases 2..=16 in which the beat is
/// a palindrome: the tone lasts twice the larger of (palindromic,
/// non-palindromic) and sits at the smaller. Rests afterwards for the tone
/// length plus the number of 2s in the beat's base-3 form.
#[derive(Debug, Clone)]
pub struct LongRule {
    pub windows: BeatWindows,
    pub lowest_base: u32,
    pub highest_base: u32,
    pub pedal_pitch: i32,
    pub melody_amplitude: i32,
    cooldown: u64,
}

impl Default for LongRule {
    fn default() -> Self {
        LongRule {
            windows: BeatWindows::single(45, 720),
            lowest_base: 2,
            highest_base: 16,
            pedal_pitch: -4,
            melody_amplitude: -5,
            cooldown: 0,
        }
    }
}

impl VoiceRule for LongRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Long
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if cooling(&mut self.cooldown) {
            return Vec::new();
        }
        let bases: Vec<Radix> = Radix::span(self.lowest_base, self.highest_base).collect();
        let palindromic: Vec<u32> = palindrome_bases(beat, bases.iter().rev().copied())
            .into_iter()
            .map(Radix::get)
            .collect();
        let palin = palindromic.len() as u64;
        let nonpalin = bases.len() as u64 - palin;
        let (length, pitch) = if palin > nonpalin {
            (2 * palin, nonpalin)
        } else {
            (2 * nonpalin, palin)
        };
        self.cooldown = length + count_digit(beat, Radix::TERNARY, 2) as u64;

        let start = beat as f64;
        vec![
            NoteRequest::at(start)
                .beats(length)
                .pitch(self.pedal_pitch)
                .ignore_busy(),
            NoteRequest::at(start)
                .beats(length)
                .pitch(pitch as i32)
                .amplitude(self.melody_amplitude)
                .ignore_busy()
                .comment(format!(
                    "; {beat} is a palindrome in {palin} bases: {palindromic:?}"
                )),
        ]
    }
}

// ---------------------------------------------------------------------------
// High
// ---------------------------------------------------------------------------

/// Chords with one note per set bit of the beat, stacked by a repeating
/// major-third / minor-third / fourth pattern. Rests for the beat's digit
/// sum, halved in the second half of the piece.
#[derive(Debug, Clone)]
pub struct HighRule {
    pub windows: BeatWindows,
    pub overtone_steps: [i32; 3],
    pub chord_length: f64,
    pub halve_rest_after: u64,
    cooldown: u64,
}

impl Default for HighRule {
    fn default() -> Self {
        HighRule {
            windows: BeatWindows::single(160, 766),
            overtone_steps: [4, 3, 5],
            chord_length: 1.0,
            halve_rest_after: 400,
            cooldown: 0,
        }
    }
}

impl VoiceRule for HighRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::High
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if cooling(&mut self.cooldown) {
            return Vec::new();
        }
        let voices = ones_in_binary(beat) as usize;
        let mut pitch = 0;
        let mut chord = Vec::with_capacity(voices);
        for i in 0..voices {
            chord.push(
                NoteRequest::at(beat as f64)
                    .length(self.chord_length)
                    .pitch(pitch)
                    .ignore_busy()
                    .comment(format!("; overtone {i}")),
            );
            pitch += self.overtone_steps[i % self.overtone_steps.len()];
        }
        self.cooldown = digit_sum(beat, Radix::DECIMAL);
        if beat > self.halve_rest_after {
            self.cooldown /= 2;
        }
        chord
    }
}

// ---------------------------------------------------------------------------
// Arpeggio
// ---------------------------------------------------------------------------

/// Beat-by-beat arpeggios through the prime factors of a composite beat.
/// Each factor raises the running pitch by `factor mod 12` (12 when that is
/// zero). After the last factor the voice rests one beat.
#[derive(Debug, Clone)]
pub struct ArpeggioRule {
    pub windows: BeatWindows,
    pub rest_after: u64,
    pending: VecDeque<u64>,
    pitch: i32,
    cooldown: u64,
}

impl Default for ArpeggioRule {
    fn default() -> Self {
        ArpeggioRule {
            windows: BeatWindows::single(222, 737),
            rest_after: 1,
            pending: VecDeque::new(),
            pitch: 0,
            cooldown: 0,
        }
    }
}

impl VoiceRule for ArpeggioRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Arpeggio
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if cooling(&mut self.cooldown) {
            return Vec::new();
        }
        let Some(factor) = self.pending.pop_front() else {
            if oracle.is_prime(beat) {
                return Vec::new();
            }
            self.pitch = 0;
            self.pending = oracle.prime_factors(beat).into();
            return vec![NoteRequest::at(beat as f64).comment(format!(
                "; Start of arpeggio: {beat} --> {:?}",
                self.pending
            ))];
        };
        self.pitch += match factor % 12 {
            0 => 12,
            step => step as i32,
        };
        if self.pending.is_empty() {
            self.cooldown = self.rest_after;
        }
        vec![
            NoteRequest::at(beat as f64)
                .pitch(self.pitch)
                .comment(format!("; {:?}", self.pending)),
        ]
    }
}

// ---------------------------------------------------------------------------
// Ascent
// ---------------------------------------------------------------------------

/// Tracks the highest base-12 digit of the beat. While it holds, the current
/// run grows; when it changes, the finished run is played retroactively as
/// one note pitched at the old digit.
#[derive(Debug, Clone)]
pub struct AscentRule {
    pub windows: BeatWindows,
    pub radix: Radix,
    /// The loudness level of a run is its digit over this.
    pub level_divisor: f64,
    run_digit: u32,
    run_length: u64,
}

impl Default for AscentRule {
    fn default() -> Self {
        AscentRule {
            windows: BeatWindows::union(&[(348, 433), (510, 577), (600, 721)]),
            radix: Radix::DUODECIMAL,
            level_divisor: 4.0,
            run_digit: 0,
            run_length: 1,
        }
    }
}

impl VoiceRule for AscentRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Ascent
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        let digit = highest_digit(beat, self.radix);
        if digit == self.run_digit {
            self.run_length += 1;
            return Vec::new();
        }
        let previous = beat.saturating_sub(1);
        let note = NoteRequest::at(beat.saturating_sub(self.run_length) as f64)
            .beats(self.run_length)
            .pitch(self.run_digit as i32)
            .level(self.run_digit as f64 / self.level_divisor)
            .comment(format!(
                "; Beat {previous} --> {}, length={}",
                to_radix_string(previous, self.radix),
                self.run_length
            ));
        self.run_length = 1;
        self.run_digit = digit;
        vec![note]
    }
}

// ---------------------------------------------------------------------------
// Erratic
// ---------------------------------------------------------------------------

/// Plays every beat: the tonic when the beat is divisible by its last
/// nonzero digit, otherwise a fourth or fifth depending on the parity of its
/// set bits. Fades out over the last beats of selected windows.
#[derive(Debug, Clone)]
pub struct ErraticRule {
    pub windows: BeatWindows,
    /// Window ends (exclusive) approached with a fade.
    pub faded_window_ends: Vec<u64>,
    /// Beats over which the fade drops by one decibel per beat.
    pub fade_length: u64,
    pub even_pitch: i32,
    pub odd_pitch: i32,
}

impl Default for ErraticRule {
    fn default() -> Self {
        ErraticRule {
            windows: BeatWindows::union(&[(252, 330), (413, 510), (580, 700)]),
            faded_window_ends: vec![510, 700],
            fade_length: 10,
            even_pitch: 5,
            odd_pitch: 7,
        }
    }
}

impl ErraticRule {
    /// Decibel offset for `beat`: 0, then -1 per beat into a fade.
    pub fn fade(&self, beat: u64) -> i32 {
        self.faded_window_ends
            .iter()
            .find_map(|&end| {
                let fade_start = end.saturating_sub(self.fade_length);
                (fade_start..end)
                    .contains(&beat)
                    .then(|| -((beat - fade_start) as i32))
            })
            .unwrap_or(0)
    }
}

impl VoiceRule for ErraticRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Erratic
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        let amplitude = self.fade(beat);
        let last = last_nonzero_digit(beat, Radix::DECIMAL) as u64;
        if last == 0 || beat % last == 0 {
            return vec![
                NoteRequest::at(beat as f64)
                    .amplitude(amplitude)
                    .comment(format!("; Beat {beat} % {last} = 0")),
            ];
        }
        let ones = ones_in_binary(beat);
        let pitch = if ones % 2 == 0 {
            self.even_pitch
        } else {
            self.odd_pitch
        };
        vec![
            NoteRequest::at(beat as f64)
                .pitch(pitch)
                .amplitude(amplitude)
                .comment(format!(
                    "; Beat {beat} % {last} = {} --> {beat:#b} has {ones} ones",
                    beat % last
                )),
        ]
    }
}

// ---------------------------------------------------------------------------
// Buzzy
// ---------------------------------------------------------------------------

/// Pitch is the base-11 digital root of the beat cubed. When the beat is
/// divisible by its own digital root but not by 3, the voice rests for the
/// spread between its highest and lowest decimal digits.
#[derive(Debug, Clone)]
pub struct BuzzyRule {
    pub windows: BeatWindows,
    pub exponent: u32,
    pub radix: Radix,
    cooldown: u64,
}

impl Default for BuzzyRule {
    fn default() -> Self {
        BuzzyRule {
            windows: BeatWindows::union(&[(116, 330), (376, 475), (550, 768)]),
            exponent: 3,
            radix: Radix::UNDECIMAL,
            cooldown: 0,
        }
    }
}

impl VoiceRule for BuzzyRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Buzzy
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if cooling(&mut self.cooldown) {
            return Vec::new();
        }
        let powered = beat.saturating_pow(self.exponent);
        let pitch = digital_root(powered, self.radix);
        let root = digital_root(beat, Radix::DECIMAL);
        if root != 0 && beat % root == 0 && beat % 3 != 0 {
            self.cooldown = (highest_digit(beat, Radix::DECIMAL)
                - lowest_digit(beat, Radix::DECIMAL)) as u64;
        }
        vec![
            NoteRequest::at(beat as f64)
                .pitch(pitch as i32)
                .comment(format!(
                    "; {beat}^{} = {powered}, digital root {pitch}",
                    self.exponent
                )),
        ]
    }
}

// ---------------------------------------------------------------------------
// Churchbell
// ---------------------------------------------------------------------------

/// Tolls when the beat's count of set bits is one of its proper divisors.
/// Pitch is the lowest decimal digit; the bell swells toward the end of its
/// window and rings for the divisor count, repeatedly added to itself until
/// it exceeds `min_length`.
#[derive(Debug, Clone)]
pub struct ChurchbellRule {
    pub windows: BeatWindows,
    pub peak_level: f64,
    /// Beat at which the swell reaches `peak_level`.
    pub swell_reference: u64,
    pub min_length: u64,
}

impl Default for ChurchbellRule {
    fn default() -> Self {
        ChurchbellRule {
            windows: BeatWindows::single(270, 660),
            peak_level: 15.0,
            swell_reference: 660,
            min_length: 8,
        }
    }
}

impl VoiceRule for ChurchbellRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Churchbell
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        let ones = ones_in_binary(beat) as u64;
        let divs = divisors(beat);
        if !divs.contains(&ones) {
            return Vec::new();
        }
        let level = self.peak_level * beat as f64 / self.swell_reference as f64;
        let count = divs.len() as u64;
        let mut length = count;
        while length <= self.min_length {
            length += count;
        }
        let pitch = lowest_digit(beat, Radix::DECIMAL);
        vec![
            NoteRequest::at(beat as f64)
                .pitch(pitch as i32)
                .level(level)
                .beats(length)
                .comment(format!(
                    "; n1s={ones}, divisors={divs:?}, pitch={pitch}, length={length}"
                )),
        ]
    }
}

// ---------------------------------------------------------------------------
// Happy
// ---------------------------------------------------------------------------

/// Happy numbers open and close a held note. On closing, the pitch is the
/// number of bases in 2..=16 in which the closing beat is happy.
#[derive(Debug, Clone)]
pub struct HappyRule {
    pub windows: BeatWindows,
    pub radix: Radix,
    pub lowest_base: u32,
    pub highest_base: u32,
    open_since: Option<u64>,
}

impl Default for HappyRule {
    fn default() -> Self {
        HappyRule {
            windows: BeatWindows::union(&[(298, 378), (435, 560), (606, 692)]),
            radix: Radix::DECIMAL,
            lowest_base: 2,
            highest_base: 16,
            open_since: None,
        }
    }
}

impl VoiceRule for HappyRule {
    fn role(&self) -> VoiceRole {
        VoiceRole::Happy
    }

    fn windows(&self) -> &BeatWindows {
        &self.windows
    }

    fn step(&mut self, beat: u64, _oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if !is_happy(beat, self.radix) {
            return Vec::new();
        }
        let Some(start) = self.open_since.take() else {
            self.open_since = Some(beat);
            return Vec::new();
        };
        let happy_bases: Vec<u32> = Radix::span(self.lowest_base, self.highest_base)
            .filter(|&r| is_happy(beat, r))
            .map(Radix::get)
            .collect();
        vec![
            NoteRequest::at(start as f64)
                .beats(beat - start)
                .pitch(happy_bases.len() as i32)
                .comment(format!(
                    "; {start} --> {beat} is happy in bases {happy_bases:?}"
                )),
        ]
    }
}
