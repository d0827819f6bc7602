//! Serializable patch definitions.

use picopoly_synth::{EnvelopeRates, Patch, PitchEnvelope, VibratoSettings, Waveform};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Amplitude envelope as written in TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Attack rate (0-127).
    pub attack: u8,
    /// Decay rate (0-127).
    pub decay: u8,
    /// Sustain level (0-127).
    pub sustain: u8,
    /// Release rate (0-127).
    pub release: u8,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 30,
            decay: 20,
            sustain: 80,
            release: 20,
        }
    }
}

impl From<EnvelopeRates> for EnvelopeConfig {
    fn from(rates: EnvelopeRates) -> Self {
        Self {
            attack: rates.attack,
            decay: rates.decay,
            sustain: rates.sustain,
            release: rates.release,
        }
    }
}

impl From<EnvelopeConfig> for EnvelopeRates {
    fn from(env: EnvelopeConfig) -> Self {
        EnvelopeRates::new(env.attack, env.decay, env.sustain, env.release)
    }
}

/// Pitch envelope as written in TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PitchEnvelopeConfig {
    /// Attack rate (0-127).
    pub attack: u8,
    /// Decay rate (0-127).
    pub decay: u8,
    /// Sustain level (0-127).
    pub sustain: u8,
    /// Release rate (0-127).
    pub release: u8,
    /// Signed depth (-127 to 127).
    pub depth: i8,
}

/// Vibrato as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VibratoConfig {
    /// LFO waveform name.
    #[serde(default = "default_waveform")]
    pub waveform: String,
    /// LFO rate (0-127).
    #[serde(default = "default_vibrato_rate")]
    pub rate: u8,
    /// Depth (0-127), further scaled by the mod wheel.
    #[serde(default)]
    pub depth: u8,
}

impl Default for VibratoConfig {
    fn default() -> Self {
        Self {
            waveform: default_waveform(),
            rate: default_vibrato_rate(),
            depth: 0,
        }
    }
}

/// One `[[patches]]` entry.
///
/// # TOML Format
///
/// ```toml
/// [[patches]]
/// name = "square-blip"
/// waveform = "square"
/// level = 100
/// amp = { attack = 30, decay = 20, sustain = 80, release = 20 }
/// pitch = { attack = 127, decay = 40, sustain = 0, release = 0, depth = 24 }
/// vibrato = { waveform = "sine", rate = 64, depth = 127 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchConfig {
    /// Display name.
    pub name: String,
    /// Oscillator waveform name.
    #[serde(default = "default_waveform")]
    pub waveform: String,
    /// Master level (0-127).
    #[serde(default = "default_level")]
    pub level: u8,
    /// Amplitude envelope.
    #[serde(default)]
    pub amp: EnvelopeConfig,
    /// Optional pitch envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<PitchEnvelopeConfig>,
    /// Vibrato.
    #[serde(default)]
    pub vibrato: VibratoConfig,
}

fn default_waveform() -> String {
    "sine".to_string()
}

fn default_level() -> u8 {
    127
}

fn default_vibrato_rate() -> u8 {
    64
}

fn check_7bit(field: impl FnOnce() -> String, value: u8) -> Result<()> {
    if value > 127 {
        return Err(ConfigError::invalid(field(), format!("{value} is outside 0..=127")));
    }
    Ok(())
}

fn parse_waveform(name: &str) -> Result<Waveform> {
    Waveform::from_name(name).ok_or_else(|| ConfigError::UnknownWaveform(name.to_string()))
}

impl PatchConfig {
    /// Create a patch with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waveform: default_waveform(),
            level: default_level(),
            amp: EnvelopeConfig::default(),
            pitch: None,
            vibrato: VibratoConfig::default(),
        }
    }

    /// Describe an engine patch under `name`.
    ///
    /// Custom wavetables have no TOML form and are written as `"custom"`,
    /// which does not load back.
    pub fn from_patch(name: impl Into<String>, patch: &Patch) -> Self {
        Self {
            name: name.into(),
            waveform: patch.waveform.name().to_string(),
            level: patch.level,
            amp: patch.amp.into(),
            pitch: patch.pitch.map(|p| PitchEnvelopeConfig {
                attack: p.rates.attack,
                decay: p.rates.decay,
                sustain: p.rates.sustain,
                release: p.rates.release,
                depth: p.depth,
            }),
            vibrato: VibratoConfig {
                waveform: patch.vibrato.waveform.name().to_string(),
                rate: patch.vibrato.rate,
                depth: patch.vibrato.depth,
            },
        }
    }

    /// Check every field. `prefix` names the patch in error messages.
    pub fn validate(&self, prefix: &str) -> Result<()> {
        parse_waveform(&self.waveform)?;
        parse_waveform(&self.vibrato.waveform)?;

        check_7bit(|| format!("{prefix}.level"), self.level)?;
        check_envelope(&format!("{prefix}.amp"), &self.amp)?;
        if let Some(pitch) = &self.pitch {
            let field = format!("{prefix}.pitch");
            check_envelope(&field, &EnvelopeConfig {
                attack: pitch.attack,
                decay: pitch.decay,
                sustain: pitch.sustain,
                release: pitch.release,
            })?;
            if pitch.depth == i8::MIN {
                return Err(ConfigError::invalid(
                    format!("{field}.depth"),
                    "must be in -127..=127",
                ));
            }
        }
        check_7bit(|| format!("{prefix}.vibrato.rate"), self.vibrato.rate)?;
        check_7bit(|| format!("{prefix}.vibrato.depth"), self.vibrato.depth)?;
        Ok(())
    }

    /// Convert to an engine patch.
    pub fn to_patch(&self) -> Result<Patch> {
        self.validate(&self.name)?;
        Ok(Patch {
            waveform: parse_waveform(&self.waveform)?,
            level: self.level,
            amp: self.amp.into(),
            pitch: self.pitch.map(|p| PitchEnvelope {
                rates: EnvelopeRates::new(p.attack, p.decay, p.sustain, p.release),
                depth: p.depth,
            }),
            vibrato: VibratoSettings {
                waveform: parse_waveform(&self.vibrato.waveform)?,
                rate: self.vibrato.rate,
                depth: self.vibrato.depth,
            },
        })
    }
}

fn check_envelope(prefix: &str, env: &EnvelopeConfig) -> Result<()> {
    check_7bit(|| format!("{prefix}.attack"), env.attack)?;
    check_7bit(|| format!("{prefix}.decay"), env.decay)?;
    check_7bit(|| format!("{prefix}.sustain"), env.sustain)?;
    check_7bit(|| format!("{prefix}.release"), env.release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use picopoly_synth::{FACTORY_PATCH_NAMES, FACTORY_PATCHES};

    #[test]
    fn minimal_patch_uses_defaults() {
        let patch: PatchConfig = toml::from_str(r#"name = "plain""#).unwrap();
        assert_eq!(patch, PatchConfig::new("plain"));
        let engine = patch.to_patch().unwrap();
        assert_eq!(engine.waveform, Waveform::Sine);
        assert_eq!(engine.level, 127);
        assert_eq!(engine.amp, EnvelopeRates::new(30, 20, 80, 20));
        assert!(engine.pitch.is_none());
    }

    #[test]
    fn factory_patches_convert_both_ways() {
        for (name, patch) in FACTORY_PATCH_NAMES.iter().zip(FACTORY_PATCHES.iter()) {
            let config = PatchConfig::from_patch(*name, patch);
            assert_eq!(config.to_patch().unwrap(), *patch, "{name}");
        }
    }

    #[test]
    fn rejects_out_of_range_and_unknown_values() {
        let mut patch = PatchConfig::new("bad");
        patch.amp.attack = 200;
        let err = patch.to_patch().unwrap_err();
        assert!(err.to_string().contains("bad.amp.attack"), "got: {err}");

        let mut patch = PatchConfig::new("bad");
        patch.vibrato.waveform = "noise".into();
        assert!(matches!(patch.to_patch(), Err(ConfigError::UnknownWaveform(w)) if w == "noise"));

        let mut patch = PatchConfig::new("bad");
        patch.pitch = Some(PitchEnvelopeConfig {
            attack: 1,
            decay: 1,
            sustain: 0,
            release: 1,
            depth: i8::MIN,
        });
        assert!(matches!(patch.to_patch(), Err(ConfigError::InvalidValue { .. })));
    }
}
