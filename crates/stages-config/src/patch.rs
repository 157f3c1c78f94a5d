//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use stages_core::{Chain, ChainInputs, NUM_CHANNELS, StageConfig, Tables};
use std::path::Path;

use crate::channel::ChannelConfig;
use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_patch};

/// Patch file format for a channel chain.
///
/// A patch is the declarative state of the whole module: one entry per
/// channel with its stage kind, loop flag, whether its gate input is patched
/// and both knobs. Channels past the end of the list keep their defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "ADSR"
/// description = "Gated attack, decay, sustain, release"
/// sample_rate = 48000
///
/// [[channels]]
/// kind = "ramp"
/// gate = true
/// primary = 0.1
///
/// [[channels]]
/// kind = "ramp"
/// primary = 0.3
///
/// [[channels]]
/// kind = "hold"
/// loop = true
/// primary = 0.6
///
/// [[channels]]
/// kind = "ramp"
/// primary = 0.4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate the lookup tables are built for (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channels, from the first one on.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

fn default_sample_rate() -> u32 {
    48000
}

impl Patch {
    /// Create a new empty patch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            channels: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Append a channel.
    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channels.push(channel);
        self
    }

    /// Append several channels.
    pub fn with_channels(mut self, channels: impl IntoIterator<Item = ChannelConfig>) -> Self {
        self.channels.extend(channels);
        self
    }

    /// Load and validate a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch = Self::from_toml(&content)?;

        if let Err(e) = patch.validate() {
            tracing::warn!(path = %path.display(), error = %e, "rejected patch");
            return Err(e.into());
        }

        tracing::debug!(
            path = %path.display(),
            name = %patch.name,
            channels = patch.len(),
            "loaded patch"
        );
        Ok(patch)
    }

    /// Parse a patch from a TOML string. Does not validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "saved patch");
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of declared channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is declared.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Get a channel by index.
    pub fn get(&self, index: usize) -> Option<&ChannelConfig> {
        self.channels.get(index)
    }

    /// Iterate over channels.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelConfig> {
        self.channels.iter()
    }

    /// Validate the patch.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_patch(self)
    }

    /// Lookup tables at the patch's sample rate.
    ///
    /// # Panics
    ///
    /// Panics if the sample rate is zero. [`validate`](Self::validate)
    /// rejects such patches.
    pub fn tables(&self) -> Tables {
        Tables::new(self.sample_rate as f32)
    }

    /// Push stage declarations into `chain`. Undeclared channels get the
    /// default stage.
    pub fn apply(&self, chain: &mut Chain<'_>) {
        for channel in 0..NUM_CHANNELS {
            let stage = self
                .channels
                .get(channel)
                .map_or_else(StageConfig::default, ChannelConfig::stage);
            chain.set_stage(channel, stage);
        }
    }

    /// Gate patching and knobs as block inputs. Gate flags are left low.
    pub fn chain_inputs(&self) -> ChainInputs {
        let mut inputs = ChainInputs::default();
        for (c, config) in self.channels.iter().take(NUM_CHANNELS).enumerate() {
            inputs.patched[c] = config.gate;
            inputs.primary[c] = config.primary;
            inputs.secondary[c] = config.secondary;
        }
        inputs
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
