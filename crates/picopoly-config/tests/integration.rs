//! Integration tests for picopoly-config.
//!
//! These tests exercise file round trips and drive the engine with loaded
//! patch banks.

use picopoly_config::{ConfigError, PatchConfig, SynthConfig, factory_patch_configs};
use picopoly_synth::{MidiEvent, SynthEngine, Waveform};
use tempfile::TempDir;

/// Saving creates missing directories and loading returns the same config.
#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("picopoly.toml");

    let mut config = SynthConfig::factory();
    config.audio.sample_rate = 48_000;
    config.audio.device = Some("USB Audio".into());
    config.midi.port = Some("Keystation".into());
    config.save(&path).expect("save should create the parent directory");

    let loaded = SynthConfig::load(&path).expect("saved config should load");
    assert_eq!(loaded, config);
}

/// A missing file reports the path it tried to read.
#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = SynthConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

/// Files that fail validation do not load.
#[test]
fn test_load_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
        [[patches]]
        name = "broken"
        waveform = "noise"
        "#,
    )
    .unwrap();

    let err = SynthConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownWaveform(ref w) if w == "noise"));
}

/// A loaded bank drives the engine and program change selects from it.
#[test]
fn test_custom_bank_in_engine() {
    let config = SynthConfig::from_toml(
        r#"
        [[patches]]
        name = "square"
        waveform = "square"

        [[patches]]
        name = "triangle"
        waveform = "triangle"
        amp = { attack = 127, decay = 0, sustain = 127, release = 127 }
        "#,
    )
    .unwrap();

    let bank = config.patch_bank().unwrap();
    let mut engine: SynthEngine = SynthEngine::with_patches(44_100, bank);

    engine.dispatch(MidiEvent::note_on(0, 60, 100));
    assert_eq!(engine.voices()[0].osc().waveform(), Waveform::Square);

    engine.dispatch(MidiEvent::program_change(1, 1));
    engine.dispatch(MidiEvent::note_on(1, 64, 100));
    assert_eq!(engine.voices()[1].osc().waveform(), Waveform::Triangle);
    assert_eq!(engine.voices()[1].patch(), 1);

    // out-of-range programs wrap into the two-patch bank
    engine.dispatch(MidiEvent::program_change(2, 5));
    engine.dispatch(MidiEvent::note_on(2, 67, 100));
    assert_eq!(engine.voices()[2].patch(), 1);

    let mut block = vec![0i32; 2 * 256];
    engine.render_block(&mut block);
    assert!(block.iter().any(|&s| s != 0));
}

/// Every factory patch written as TOML loads back to the same engine patch.
#[test]
fn test_factory_patches_as_toml() {
    let configs = factory_patch_configs();
    let config = SynthConfig {
        patches: configs.clone(),
        ..SynthConfig::default()
    };
    let text = config.to_toml().unwrap();
    assert!(text.contains("[[patches]]"));

    let loaded = SynthConfig::from_toml(&text).unwrap();
    for (a, b) in loaded.patches.iter().zip(configs.iter()) {
        assert_eq!(a.to_patch().unwrap(), b.to_patch().unwrap(), "{}", a.name);
    }
}

/// Patch names track whichever bank is active.
#[test]
fn test_patch_names() {
    let config = SynthConfig::default();
    assert_eq!(config.patch_names().len(), 4);

    let config = SynthConfig {
        patches: vec![PatchConfig::new("a"), PatchConfig::new("b")],
        ..SynthConfig::default()
    };
    assert_eq!(config.patch_names(), vec!["a", "b"]);
}
