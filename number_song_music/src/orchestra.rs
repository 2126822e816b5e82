// The ten voices of the piece and their built-in instrument table.
//
// Voices are identified by `VoiceRole` and always rendered in the declared
// order of `VoiceRole::ALL`. The instrument numbers (i1..i11) refer to
// instruments in the external Csound orchestra; the default pitches and
// amplitudes here were tuned against that orchestra.

use crate::instrument::{Instrument, InstrumentConfig};
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};

/// A voice in the piece, in score output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceRole {
    Bass = 0,
    Arpeggio = 1,
    High = 2,
    Quick = 3,
    Long = 4,
    Ascent = 5,
    Erratic = 6,
    Buzzy = 7,
    Churchbell = 8,
    Happy = 9,
}

impl VoiceRole {
    pub const ALL: [VoiceRole; 10] = [
        VoiceRole::Bass,
        VoiceRole::Arpeggio,
        VoiceRole::High,
        VoiceRole::Quick,
        VoiceRole::Long,
        VoiceRole::Ascent,
        VoiceRole::Erratic,
        VoiceRole::Buzzy,
        VoiceRole::Churchbell,
        VoiceRole::Happy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            VoiceRole::Bass => "bass",
            VoiceRole::Arpeggio => "arpeggio",
            VoiceRole::High => "high",
            VoiceRole::Quick => "quick",
            VoiceRole::Long => "long",
            VoiceRole::Ascent => "ascent",
            VoiceRole::Erratic => "erratic",
            VoiceRole::Buzzy => "buzzy",
            VoiceRole::Churchbell => "churchbell",
            VoiceRole::Happy => "happy",
        }
    }

    /// The built-in instrument definition for this voice.
    pub fn default_instrument(self) -> InstrumentConfig {
        match self {
            VoiceRole::Bass => InstrumentConfig::new("i4", "i4", Pitch::new(5, 7), 86.0),
            VoiceRole::Arpeggio => InstrumentConfig::new("i1", "i1", Pitch::new(8, 6), 74.0)
                .with_field("attack", 6, 0.02)
                .with_field("reverb", 7, 1.5)
                .with_default("release", 0.01),
            VoiceRole::High => InstrumentConfig::new("i5", "i5", Pitch::new(7, 8), 70.0)
                .with_field("attack", 6, 0.1)
                .with_field("modulator", 7, 1.0),
            VoiceRole::Quick => InstrumentConfig::new("i3", "i3", Pitch::new(8, 0), 81.0)
                .with_field("attack", 6, 0.03)
                .with_field("release", 7, 0.3),
            VoiceRole::Long => InstrumentConfig::new("i2", "i2", Pitch::new(7, 0), 71.0)
                .with_field("attack", 6, 1.0)
                .with_field("modulator", 7, 1.0)
                .with_field("index_of_modulation", 8, 8.0),
            VoiceRole::Ascent => InstrumentConfig::new("i6", "i6", Pitch::new(7, 1), 80.0)
                .with_field("attack", 6, 0.05)
                .with_field("release", 7, 0.4),
            VoiceRole::Erratic => InstrumentConfig::new("i7", "i7", Pitch::new(7, 8), 82.0),
            VoiceRole::Buzzy => InstrumentConfig::new("i8", "i8", Pitch::new(8, 6), 77.0)
                .with_field("attack", 6, 0.1)
                .with_field("release", 7, 0.1),
            VoiceRole::Churchbell => InstrumentConfig::new("i9", "i9", Pitch::new(6, 4), 77.0)
                .with_field("hardness", 6, 0.5)
                .with_field("position", 7, 0.9)
                .with_field("vibf", 8, 441.0)
                .with_field("vibamp", 9, 12.0),
            VoiceRole::Happy => InstrumentConfig::new("i10", "i11", Pitch::new(6, 9), 86.0)
                .with_field("attack", 6, 0.1)
                .with_field("release", 7, 0.1),
        }
    }
}

/// One voice definition: which role it plays and how it sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub role: VoiceRole,
    pub instrument: InstrumentConfig,
}

/// All ten voices, indexed by `VoiceRole::index()`.
#[derive(Debug, Clone)]
pub struct Orchestra {
    instruments: Vec<Instrument>,
}

impl Default for Orchestra {
    fn default() -> Self {
        Orchestra::new(&default_voices())
    }
}

impl Orchestra {
    /// Build from voice definitions. Roles missing from `voices` fall back
    /// to their built-in instrument; a repeated role keeps the last entry.
    pub fn new(voices: &[VoiceConfig]) -> Self {
        let mut configs: Vec<InstrumentConfig> =
            VoiceRole::ALL.iter().map(|r| r.default_instrument()).collect();
        for voice in voices {
            configs[voice.role.index()] = voice.instrument.clone();
        }
        Orchestra {
            instruments: configs.into_iter().map(Instrument::new).collect(),
        }
    }

    pub fn instrument(&self, role: VoiceRole) -> &Instrument {
        &self.instruments[role.index()]
    }

    pub fn instrument_mut(&mut self, role: VoiceRole) -> &mut Instrument {
        &mut self.instruments[role.index()]
    }

    /// Voices in output order.
    pub fn iter(&self) -> impl Iterator<Item = (VoiceRole, &Instrument)> {
        VoiceRole::ALL.iter().map(move |&r| (r, &self.instruments[r.index()]))
    }

    pub fn total_notes(&self) -> usize {
        self.instruments.iter().map(|i| i.notes().len()).sum()
    }
}

/// The built-in orchestra as a list of voice definitions.
pub fn default_voices() -> Vec<VoiceConfig> {
    VoiceRole::ALL
        .iter()
        .map(|&role| VoiceConfig {
            role,
            instrument: role.default_instrument(),
        })
        .collect()
}
