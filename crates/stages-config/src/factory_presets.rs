//! Factory patches bundled with the library.
//!
//! Built-in patches that are always available without external files. They
//! cover the classic uses of the module and serve as starting points.

use crate::{ConfigError, Patch};

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "adsr",
    "looping_ad",
    "lfo_bank",
    "sample_and_hold",
    "slew",
];

/// TOML content for factory presets.
///
/// These are embedded at compile time and always available.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("adsr", ADSR_PRESET),
    ("looping_ad", LOOPING_AD_PRESET),
    ("lfo_bank", LFO_BANK_PRESET),
    ("sample_and_hold", SAMPLE_AND_HOLD_PRESET),
    ("slew", SLEW_PRESET),
];

const INIT_PRESET: &str = r#"
name = "Init"
description = "Six idle ramps, every output at zero"
sample_rate = 48000

[[channels]]
[[channels]]
[[channels]]
[[channels]]
[[channels]]
[[channels]]
"#;

const ADSR_PRESET: &str = r#"
name = "ADSR"
description = "Gated attack, decay, sustain and release on the first four channels"
sample_rate = 48000

[[channels]]
kind = "ramp"
gate = true
primary = 0.2
secondary = 0.3

[[channels]]
kind = "ramp"
primary = 0.4
secondary = 0.6

[[channels]]
kind = "hold"
loop = true
primary = 0.6

[[channels]]
kind = "ramp"
primary = 0.5
secondary = 0.6
"#;

const LOOPING_AD_PRESET: &str = r#"
name = "Looping AD"
description = "Attack and decay cycling while the gate is high"
sample_rate = 48000

[[channels]]
kind = "ramp"
loop = true
gate = true
primary = 0.3
secondary = 0.2

[[channels]]
kind = "ramp"
loop = true
primary = 0.45
secondary = 0.8
"#;

const LFO_BANK_PRESET: &str = r#"
name = "LFO Bank"
description = "Six free-running LFOs from triangle to ramp"
sample_rate = 48000

[[channels]]
kind = "ramp"
loop = true
primary = 0.2
secondary = 0.5

[[channels]]
kind = "ramp"
loop = true
primary = 0.3
secondary = 0.5

[[channels]]
kind = "ramp"
loop = true
primary = 0.4
secondary = 0.7

[[channels]]
kind = "ramp"
loop = true
primary = 0.5
secondary = 0.9

[[channels]]
kind = "ramp"
loop = true
primary = 0.6
secondary = 0.25

[[channels]]
kind = "ramp"
loop = true
primary = 0.7
secondary = 0.0
"#;

const SAMPLE_AND_HOLD_PRESET: &str = r#"
name = "Sample and Hold"
description = "Six independent sample and holds with light output smoothing"
sample_rate = 48000

[[channels]]
kind = "step"
gate = true
secondary = 0.1

[[channels]]
kind = "step"
gate = true
secondary = 0.1

[[channels]]
kind = "step"
gate = true
secondary = 0.1

[[channels]]
kind = "step"
gate = true
secondary = 0.1

[[channels]]
kind = "step"
gate = true
secondary = 0.1

[[channels]]
kind = "step"
gate = true
secondary = 0.1
"#;

const SLEW_PRESET: &str = r#"
name = "Slew"
description = "Six slew limiters, linear to exponential"
sample_rate = 48000

[[channels]]
kind = "step"
secondary = 0.2

[[channels]]
kind = "step"
secondary = 0.35

[[channels]]
kind = "step"
secondary = 0.45

[[channels]]
kind = "step"
secondary = 0.55

[[channels]]
kind = "step"
secondary = 0.65

[[channels]]
kind = "step"
secondary = 0.8
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use stages_config::factory_presets;
///
/// for patch in factory_presets() {
///     println!("{}: {}", patch.name, patch.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<Patch> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use stages_config::get_factory_preset;
///
/// let adsr = get_factory_preset("ADSR").unwrap();
/// assert_eq!(adsr.len(), 4);
/// assert!(get_factory_preset("Looping AD").is_some());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Patch> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return Patch::from_toml(toml).ok();
    }

    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .find(|patch| patch.name.to_lowercase() == name_lower)
}

/// Like [`get_factory_preset`], reporting a missing preset as an error.
pub fn load_factory_preset(name: &str) -> Result<Patch, ConfigError> {
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Get the identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset identifier or display name.
///
/// # Example
///
/// ```rust
/// use stages_config::is_factory_preset;
///
/// assert!(is_factory_preset("lfo_bank"));
/// assert!(is_factory_preset("LFO Bank"));
/// assert!(!is_factory_preset("wobble"));
/// ```
pub fn is_factory_preset(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    FACTORY_PRESET_NAMES
        .iter()
        .any(|id| id.to_lowercase() == name_lower)
        || get_factory_preset(name).is_some()
}
