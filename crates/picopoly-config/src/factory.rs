//! The built-in patch bank in configuration form.

use picopoly_synth::{FACTORY_PATCH_NAMES, FACTORY_PATCHES};

use crate::patch::PatchConfig;

/// The factory patches as `[[patches]]` entries, in program order.
pub fn factory_patch_configs() -> Vec<PatchConfig> {
    FACTORY_PATCH_NAMES
        .iter()
        .zip(FACTORY_PATCHES.iter())
        .map(|(name, patch)| PatchConfig::from_patch(*name, patch))
        .collect()
}

/// Names of the factory patches.
pub fn factory_patch_names() -> &'static [&'static str] {
    &FACTORY_PATCH_NAMES
}

/// Look up a factory patch by name (case-insensitive).
pub fn get_factory_patch(name: &str) -> Option<PatchConfig> {
    factory_patch_configs()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}
