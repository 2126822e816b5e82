// The beat loop.
//
// Composition is a single left-to-right pass over an integer beat counter.
// Every voice is driven by a `VoiceRule`: a small state machine that is
// active only inside its beat windows and, on each active beat, looks at
// arithmetic properties of the beat number to decide whether to play, what
// to play, and how long to stay quiet afterwards.
//
// Rules never see each other's state or the orchestra; they return note
// requests and the loop hands those to the matching `Instrument`, whose busy
// guard has the final say. The only thing shared between rules is the
// `NumberOracle`, whose caches affect speed but never results, so voice
// order within a beat is irrelevant. Order across beats is what matters:
// cooldowns and open runs carry forward from one beat to the next.
//
// See rules.rs for the ten rule implementations.

use crate::error::Result;
use crate::instrument::NoteRequest;
use crate::orchestra::{Orchestra, VoiceRole};
use crate::rules::default_rules;
use number_song_heuristics::NumberOracle;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// A union of half-open beat ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatWindows(Vec<Range<u64>>);

impl BeatWindows {
    pub fn single(start: u64, end: u64) -> Self {
        BeatWindows(vec![start..end])
    }

    /// Several disjoint windows, each `(start, end)` with `end` exclusive.
    pub fn union(ranges: &[(u64, u64)]) -> Self {
        BeatWindows(ranges.iter().map(|&(s, e)| s..e).collect())
    }

    /// Every beat from `start` onward.
    pub fn from_start(start: u64) -> Self {
        BeatWindows(vec![start..u64::MAX])
    }

    pub fn contains(&self, beat: u64) -> bool {
        self.0.iter().any(|r| r.contains(&beat))
    }

    pub fn ranges(&self) -> &[Range<u64>] {
        &self.0
    }
}

/// Per-voice composition logic.
pub trait VoiceRule {
    fn role(&self) -> VoiceRole;

    fn windows(&self) -> &BeatWindows;

    /// Handle one beat inside the rule's windows.
    fn step(&mut self, beat: u64, oracle: &mut NumberOracle) -> Vec<NoteRequest>;

    /// Handle one beat of the piece; a no-op outside the rule's windows.
    fn advance(&mut self, beat: u64, oracle: &mut NumberOracle) -> Vec<NoteRequest> {
        if self.windows().contains(beat) {
            self.step(beat, oracle)
        } else {
            Vec::new()
        }
    }
}

/// Beat range of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// First beat (inclusive).
    pub start_beat: u64,
    /// Last beat (exclusive). 810 beats at 217 BPM is about 3:44.
    pub end_beat: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig {
            start_beat: 3,
            end_beat: 810,
        }
    }
}

/// Counts from one composition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionSummary {
    pub beats: u64,
    /// Accepted notes per voice, indexed by `VoiceRole::index()`.
    pub accepted: [usize; 10],
    /// Requests the busy guard rejected, across all voices.
    pub dropped: usize,
}

impl CompositionSummary {
    pub fn accepted_for(&self, role: VoiceRole) -> usize {
        self.accepted[role.index()]
    }

    pub fn total_accepted(&self) -> usize {
        self.accepted.iter().sum()
    }
}

/// Owns the voice rules and the number caches for one piece.
pub struct Composer {
    rules: Vec<Box<dyn VoiceRule>>,
    oracle: NumberOracle,
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new(default_rules())
    }
}

impl Composer {
    pub fn new(rules: Vec<Box<dyn VoiceRule>>) -> Self {
        Composer {
            rules,
            oracle: NumberOracle::new(),
        }
    }

    pub fn oracle(&self) -> &NumberOracle {
        &self.oracle
    }

    /// Feed one beat to every rule and append the resulting notes.
    pub fn compose_beat(
        &mut self,
        beat: u64,
        orchestra: &mut Orchestra,
        summary: &mut CompositionSummary,
    ) -> Result<()> {
        for rule in &mut self.rules {
            let role = rule.role();
            for request in rule.advance(beat, &mut self.oracle) {
                if orchestra.instrument_mut(role).add_note(request)? {
                    summary.accepted[role.index()] += 1;
                } else {
                    summary.dropped += 1;
                }
            }
        }
        Ok(())
    }

    /// Run every beat in `config.start_beat..config.end_beat`.
    pub fn compose(
        &mut self,
        orchestra: &mut Orchestra,
        config: &ComposerConfig,
    ) -> Result<CompositionSummary> {
        let mut summary = CompositionSummary::default();
        for beat in config.start_beat..config.end_beat {
            self.compose_beat(beat, orchestra, &mut summary)?;
            summary.beats += 1;
        }
        debug!(
            beats = summary.beats,
            notes = summary.total_accepted(),
            dropped = summary.dropped,
            primes_cached = self.oracle.primes().len(),
            "composition finished"
        );
        Ok(summary)
    }
}

/// Compose a piece with the built-in rules.
pub fn compose(orchestra: &mut Orchestra, config: &ComposerConfig) -> Result<CompositionSummary> {
    Composer::default().compose(orchestra, config)
}
