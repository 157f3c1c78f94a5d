//! Patch validation.
//!
//! Checks what the chain would otherwise silently correct: too many channels,
//! knobs outside [0, 1], and groups holding more loop points than the
//! compiler understands.
//!
//! # Example
//!
//! ```rust
//! use stages_config::{ChannelConfig, Patch, ValidationError, validate_patch};
//! use stages_core::StageKind;
//!
//! let patch = Patch::new("Three loops").with_channels([
//!     ChannelConfig::new(StageKind::Ramp).gated().looping(),
//!     ChannelConfig::new(StageKind::Ramp).looping(),
//!     ChannelConfig::new(StageKind::Ramp).looping(),
//! ]);
//!
//! assert!(matches!(
//!     validate_patch(&patch),
//!     Err(ValidationError::TooManyLoops { first_channel: 0, count: 3 })
//! ));
//! ```

use stages_core::{GroupBuilder, MAX_LOOPS_PER_GROUP, NUM_CHANNELS};
use thiserror::Error;

use crate::Patch;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Patch declares no channels.
    #[error("patch has no channels")]
    EmptyPatch,

    /// Patch declares more channels than the chain has.
    #[error("patch has {count} channels, at most {max} are available")]
    TooManyChannels {
        /// Number of declared channels.
        count: usize,
        /// Number of channels in the chain.
        max: usize,
    },

    /// A group holds more loop points than a segment table can express.
    #[error("group starting at channel {first_channel} has {count} loop points")]
    TooManyLoops {
        /// First channel of the offending group.
        first_channel: usize,
        /// Number of looping channels in the group.
        count: usize,
    },

    /// Knob value outside [0, 1] or not finite.
    #[error("channel {channel} {param} value {value} out of range [0, 1]")]
    OutOfRange {
        /// Channel index.
        channel: usize,
        /// Knob name.
        param: &'static str,
        /// The offending value.
        value: f32,
    },

    /// Sample rate outside the supported range.
    #[error("sample rate {0} Hz is not supported")]
    InvalidSampleRate(u32),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a knob value.
pub fn validate_knob(channel: usize, param: &'static str, value: f32) -> ValidationResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            channel,
            param,
            value,
        })
    }
}

/// Validate a complete patch, collecting every problem found.
pub fn validate_patch(patch: &Patch) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&patch.sample_rate) {
        errors.push(ValidationError::InvalidSampleRate(patch.sample_rate));
    }

    if patch.channels.is_empty() {
        errors.push(ValidationError::EmptyPatch);
    } else if patch.channels.len() > NUM_CHANNELS {
        errors.push(ValidationError::TooManyChannels {
            count: patch.channels.len(),
            max: NUM_CHANNELS,
        });
    }

    for (channel, config) in patch.channels.iter().enumerate() {
        if let Err(e) = validate_knob(channel, "primary", config.primary) {
            errors.push(e);
        }
        if let Err(e) = validate_knob(channel, "secondary", config.secondary) {
            errors.push(e);
        }
    }

    let inputs = patch.chain_inputs();
    let mut builder = GroupBuilder::new();
    builder.build(&inputs.patched);
    for group in builder.groups() {
        let count = group
            .channels()
            .filter_map(|c| patch.channels.get(c))
            .filter(|c| c.looping)
            .count();
        if count > MAX_LOOPS_PER_GROUP {
            errors.push(ValidationError::TooManyLoops {
                first_channel: group.first,
                count,
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
