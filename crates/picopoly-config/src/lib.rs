//! Configuration for the picopoly synthesizer.
//!
//! A single TOML file covers audio output, MIDI input and the patch bank.
//! Every section is optional and falls back to defaults; values are checked
//! by [`SynthConfig::validate`] whenever a file is loaded.
//!
//! # Example
//!
//! ```rust
//! use picopoly_config::SynthConfig;
//!
//! let config = SynthConfig::from_toml(r#"
//!     [audio]
//!     sample_rate = 48000
//!
//!     [[patches]]
//!     name = "bright"
//!     waveform = "sawtooth"
//!     vibrato = { rate = 80, depth = 40 }
//! "#).unwrap();
//!
//! let bank = config.patch_bank().unwrap();
//! assert_eq!(bank.len(), 1);
//! assert_eq!(config.audio.block_size, 256);
//! ```

mod config;
mod error;
mod patch;

/// Factory patches in configuration form.
pub mod factory;

/// Platform-specific configuration paths.
pub mod paths;

pub use config::{AudioConfig, MidiConfig, SynthConfig};
pub use error::{ConfigError, Result};
pub use factory::{factory_patch_configs, factory_patch_names, get_factory_patch};
pub use patch::{EnvelopeConfig, PatchConfig, PitchEnvelopeConfig, VibratoConfig};
pub use paths::{CONFIG_FILE_NAME, default_config_path, ensure_user_config_dir, user_config_dir};
