// Generator configuration, loadable from JSON.
//
// Every field has a default, so a config file only needs the keys it
// changes; `{}` is a valid config that reproduces the built-in piece. Voice
// definitions not listed in `voices` keep their built-in instrument.

use crate::composer::ComposerConfig;
use crate::error::{Result, ScoreError};
use crate::orchestra::{Orchestra, VoiceConfig, default_voices};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Slowest tempo whose beat period fits a MIDI tempo event.
pub const MIN_TEMPO_BPM: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// First beat composed (inclusive).
    pub start_beat: u64,
    /// Last beat composed (exclusive).
    pub end_beat: u64,
    pub tempo_bpm: u32,
    pub voices: Vec<VoiceConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let composer = ComposerConfig::default();
        GeneratorConfig {
            start_beat: composer.start_beat,
            end_beat: composer.end_beat,
            tempo_bpm: 217,
            voices: default_voices(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_beat > self.end_beat {
            return Err(ScoreError::InvalidArgument(format!(
                "start beat {} is after end beat {}",
                self.start_beat, self.end_beat
            )));
        }
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return Err(ScoreError::InvalidArgument(format!(
                "tempo {} BPM is below the minimum of {MIN_TEMPO_BPM}",
                self.tempo_bpm
            )));
        }
        Ok(())
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            start_beat: self.start_beat,
            end_beat: self.end_beat,
        }
    }

    /// A fresh orchestra with empty timelines.
    pub fn orchestra(&self) -> Orchestra {
        Orchestra::new(&self.voices)
    }
}
