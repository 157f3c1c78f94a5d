//! Patch files and presets for stages segment generators.
//!
//! This crate is the declarative layer over `stages-core`: a [`Patch`]
//! describes every channel of a chain (stage kind, loop flag, gate patching
//! and knobs), can be loaded from and saved to TOML, is validated before use,
//! and pushes its stage declarations into a [`Chain`](stages_core::Chain).
//!
//! # Features
//!
//! - **Patches**: Load and save chain patches as TOML files
//! - **Validation**: Channel count, knob ranges and loop points per group
//! - **Factory Presets**: Built-in patches for common uses
//!
//! # Example
//!
//! ```rust
//! use stages_config::{ChannelConfig, Patch};
//! use stages_core::{BLOCK_SIZE, Chain, NUM_CHANNELS, Output, StageKind};
//!
//! let patch = Patch::new("AD")
//!     .with_channel(ChannelConfig::new(StageKind::Ramp).gated().with_knobs(0.2, 0.5))
//!     .with_channel(ChannelConfig::new(StageKind::Ramp).with_knobs(0.4, 0.5));
//! patch.validate().unwrap();
//!
//! let tables = patch.tables();
//! let mut chain = Chain::new(&tables);
//! patch.apply(&mut chain);
//!
//! let inputs = patch.chain_inputs();
//! let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];
//! chain.process(&inputs, &mut out);
//! ```

mod channel;
mod error;
mod patch;

/// Patch validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use channel::ChannelConfig;
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset, load_factory_preset,
};
pub use patch::Patch;
pub use validation::{
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, ValidationError, ValidationResult, validate_knob,
    validate_patch,
};
