//! Per-channel patch entries.

use serde::{Deserialize, Serialize};
use stages_core::{StageConfig, StageKind};

/// Configuration of one channel: its stage, gate patching and knobs.
///
/// # Example
///
/// ```rust
/// use stages_config::ChannelConfig;
/// use stages_core::StageKind;
///
/// let sustain = ChannelConfig::new(StageKind::Hold)
///     .looping()
///     .with_knobs(0.6, 0.5);
///
/// assert!(sustain.looping);
/// assert!(!sustain.gate);
/// assert_eq!(sustain.stage().kind, StageKind::Hold);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    /// Stage kind.
    #[serde(default)]
    pub kind: StageKind,

    /// Loop membership.
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// Whether the channel's gate input is patched. A patched channel starts
    /// a new group.
    #[serde(default)]
    pub gate: bool,

    /// Primary knob in [0, 1].
    #[serde(default = "default_knob")]
    pub primary: f32,

    /// Secondary knob in [0, 1].
    #[serde(default = "default_knob")]
    pub secondary: f32,
}

fn default_knob() -> f32 {
    0.5
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new(StageKind::default())
    }
}

impl ChannelConfig {
    /// Create an unpatched, non-looping channel with centered knobs.
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            looping: false,
            gate: false,
            primary: default_knob(),
            secondary: default_knob(),
        }
    }

    /// Mark the channel as looping.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Mark the channel's gate input as patched.
    pub fn gated(mut self) -> Self {
        self.gate = true;
        self
    }

    /// Set both knobs.
    pub fn with_knobs(mut self, primary: f32, secondary: f32) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// Stage declaration for the chain.
    pub fn stage(&self) -> StageConfig {
        StageConfig {
            kind: self.kind,
            looping: self.looping,
        }
    }
}
