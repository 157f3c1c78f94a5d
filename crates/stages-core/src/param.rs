//! Per-block knob interpolation.
//!
//! Knob values arrive once per block. Jumping to the new value on the first
//! sample of a block produces a staircase, so personalities that feed a knob
//! straight to the output ramp it linearly from the previous block's value
//! across the block instead.
//!
//! ## Usage
//!
//! ```rust
//! use stages_core::BlockInterpolator;
//!
//! let mut state = 0.0;
//! let mut knob = BlockInterpolator::new(state, 1.0, 4);
//! let ramp: Vec<f32> = (0..4).map(|_| knob.next()).collect();
//! assert_eq!(ramp, [0.25, 0.5, 0.75, 1.0]);
//! state = knob.value();
//! assert_eq!(state, 1.0);
//! ```

/// Linear ramp from the previous block's knob value to the current one.
///
/// The caller owns the persistent state: build the interpolator from it at
/// the start of a block and store [`value`](Self::value) back at the end.
#[derive(Debug, Clone, Copy)]
pub struct BlockInterpolator {
    /// Value returned by the most recent [`next`](Self::next)
    value: f32,
    /// Increment per sample
    increment: f32,
}

impl BlockInterpolator {
    /// Interpolate from `previous` to `target` over `size` samples.
    ///
    /// A `size` of zero snaps straight to the target.
    #[inline]
    pub fn new(previous: f32, target: f32, size: usize) -> Self {
        if size == 0 {
            return Self {
                value: target,
                increment: 0.0,
            };
        }
        Self {
            value: previous,
            increment: (target - previous) / size as f32,
        }
    }

    /// Advance one sample and return the interpolated value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.value += self.increment;
        self.value
    }

    /// Value at a fractional position `t` in [0, 1] past the current sample,
    /// without advancing.
    #[inline]
    pub fn subsample(&self, t: f32) -> f32 {
        self.value + self.increment * t
    }

    /// Current value, to be stored as next block's starting point.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }
}
