//! Top-level configuration file.

use std::path::Path;

use picopoly_synth::{MAX_PATCHES, PatchBank};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::factory::factory_patch_configs;
use crate::patch::PatchConfig;

/// Audio output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioConfig {
    /// Sample rate in Hz (8000-192000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Frames per render block (1-4096).
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Right shift from the `i32` mix to 16-bit output (0-16).
    #[serde(default = "default_output_shift")]
    pub output_shift: u32,
    /// Output device name substring; the default device when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            output_shift: default_output_shift(),
            device: None,
        }
    }
}

/// MIDI input settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiConfig {
    /// Input port name substring; the first port when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Capacity of the ingest to render event queue (1-65536).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            port: None,
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_block_size() -> usize {
    256
}

fn default_output_shift() -> u32 {
    2
}

fn default_queue_capacity() -> usize {
    256
}

/// Synthesizer configuration.
///
/// Every section is optional; an empty file is a valid configuration. When
/// no `[[patches]]` are given the factory bank is used.
///
/// # TOML Format
///
/// ```toml
/// [audio]
/// sample_rate = 48000
/// block_size = 128
///
/// [midi]
/// port = "Keystation"
///
/// [[patches]]
/// name = "organ"
/// waveform = "square"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynthConfig {
    /// Audio output.
    #[serde(default)]
    pub audio: AudioConfig,
    /// MIDI input.
    #[serde(default)]
    pub midi: MidiConfig,
    /// Patch bank, in program order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<PatchConfig>,
}

impl SynthConfig {
    /// Default settings with the factory patches written out.
    pub fn factory() -> Self {
        Self {
            patches: factory_patch_configs(),
            ..Self::default()
        }
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: SynthConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every range and name.
    pub fn validate(&self) -> Result<()> {
        let audio = &self.audio;
        if !(8_000..=192_000).contains(&audio.sample_rate) {
            return Err(ConfigError::invalid(
                "audio.sample_rate",
                format!("{} is outside 8000..=192000", audio.sample_rate),
            ));
        }
        if !(1..=4096).contains(&audio.block_size) {
            return Err(ConfigError::invalid(
                "audio.block_size",
                format!("{} is outside 1..=4096", audio.block_size),
            ));
        }
        if audio.output_shift > 16 {
            return Err(ConfigError::invalid(
                "audio.output_shift",
                format!("{} is outside 0..=16", audio.output_shift),
            ));
        }
        if !(1..=65_536).contains(&self.midi.queue_capacity) {
            return Err(ConfigError::invalid(
                "midi.queue_capacity",
                format!("{} is outside 1..=65536", self.midi.queue_capacity),
            ));
        }

        if self.patches.len() > MAX_PATCHES {
            return Err(ConfigError::TooManyPatches {
                count: self.patches.len(),
                max: MAX_PATCHES,
            });
        }
        for (i, patch) in self.patches.iter().enumerate() {
            patch.validate(&format!("patches[{i}]"))?;
        }
        Ok(())
    }

    /// Patch bank for the engine; the factory bank when none is configured.
    pub fn patch_bank(&self) -> Result<PatchBank> {
        if self.patches.is_empty() {
            return Ok(PatchBank::factory());
        }
        self.custom_patch_bank()
    }

    /// Patch bank built only from the configured patches.
    pub fn custom_patch_bank(&self) -> Result<PatchBank> {
        if self.patches.is_empty() {
            return Err(ConfigError::EmptyPatchBank);
        }
        if self.patches.len() > MAX_PATCHES {
            return Err(ConfigError::TooManyPatches {
                count: self.patches.len(),
                max: MAX_PATCHES,
            });
        }
        let patches = self
            .patches
            .iter()
            .map(PatchConfig::to_patch)
            .collect::<Result<Vec<_>>>()?;
        Ok(PatchBank::from_slice(&patches))
    }

    /// Patch names in program order, matching [`SynthConfig::patch_bank`].
    pub fn patch_names(&self) -> Vec<String> {
        if self.patches.is_empty() {
            factory_patch_configs().into_iter().map(|p| p.name).collect()
        } else {
            self.patches.iter().map(|p| p.name.clone()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = SynthConfig::from_toml("").unwrap();
        assert_eq!(config, SynthConfig::default());
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.audio.block_size, 256);
        assert_eq!(config.audio.output_shift, 2);
        assert_eq!(config.midi.queue_capacity, 256);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = SynthConfig::from_toml(
            r#"
            [audio]
            sample_rate = 48000
            device = "USB"

            [midi]
            port = "Keystation"
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.audio.block_size, 256);
        assert_eq!(config.audio.device.as_deref(), Some("USB"));
        assert_eq!(config.midi.port.as_deref(), Some("Keystation"));
    }

    #[test]
    fn rejects_out_of_range_audio() {
        let err = SynthConfig::from_toml("[audio]\nblock_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "audio.block_size"));

        let err = SynthConfig::from_toml("[audio]\nsample_rate = 1000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "audio.sample_rate"));

        let err = SynthConfig::from_toml("[audio]\noutput_shift = 17").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = SynthConfig::from_toml("[midi]\nqueue_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SynthConfig::from_toml("[audio\nsample_rate = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn too_many_patches() {
        let mut config = SynthConfig::default();
        config.patches = (0..17).map(|i| PatchConfig::new(format!("p{i}"))).collect();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyPatches { count: 17, max: 16 })
        ));
    }

    #[test]
    fn bank_selection() {
        let config = SynthConfig::default();
        assert_eq!(config.patch_bank().unwrap(), PatchBank::factory());
        assert!(matches!(config.custom_patch_bank(), Err(ConfigError::EmptyPatchBank)));
        assert_eq!(config.patch_names()[0], "sine-lead");

        let config = SynthConfig::from_toml("[[patches]]\nname = \"only\"\nwaveform = \"saw\"").unwrap();
        let bank = config.patch_bank().unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(config.patch_names(), vec!["only".to_string()]);
    }

    #[test]
    fn factory_config_round_trips() {
        let config = SynthConfig::factory();
        let text = config.to_toml().unwrap();
        let back = SynthConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.patch_bank().unwrap(), PatchBank::factory());
    }
}
