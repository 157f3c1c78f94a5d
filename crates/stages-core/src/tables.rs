//! Rate and lag lookup tables.
//!
//! Knob positions are normalized to [0, 1]. Two interpolated tables turn
//! them into per-sample quantities at a fixed sample rate:
//!
//! | Table | Entries | Knob 0 | Knob 1 | Response |
//! |-------|---------|--------|--------|----------|
//! | segment rate | 2049 | 0.5 ms | 16 s | exponential in time |
//! | portamento | 513 | no lag | 4 s | exponential in time |
//!
//! A single [`Tables`] value is built once per sample rate and shared by
//! reference between every generator of an instrument. Generators never
//! mutate it.
//!
//! ```rust
//! use stages_core::Tables;
//!
//! let tables = Tables::new(48000.0);
//! let fast = tables.rate_to_frequency(0.0);
//! let slow = tables.rate_to_frequency(1.0);
//! assert!(fast > slow);
//! assert_eq!(tables.portamento_to_coefficient(0.0), 1.0);
//! ```

use crate::math::crossfade;
use libm::{expf, powf};

/// Number of entries in the segment rate table.
pub const RATE_TABLE_SIZE: usize = 2049;

/// Number of entries in the portamento coefficient table.
pub const PORTAMENTO_TABLE_SIZE: usize = 513;

/// Shortest segment duration, in seconds (rate knob fully down).
pub const MIN_SEGMENT_TIME: f32 = 0.0005;

/// Longest segment duration, in seconds (rate knob fully up).
pub const MAX_SEGMENT_TIME: f32 = 16.0;

/// Shortest non-zero lag time, in seconds.
pub const MIN_PORTAMENTO_TIME: f32 = 0.0005;

/// Longest lag time, in seconds (lag knob fully up).
pub const MAX_PORTAMENTO_TIME: f32 = 4.0;

/// Interpolated lookup tables for one sample rate.
#[derive(Debug, Clone)]
pub struct Tables {
    sample_rate: f32,
    /// Phase increment per sample, indexed by rate knob.
    segment_frequency: [f32; RATE_TABLE_SIZE],
    /// One-pole coefficient, indexed by lag knob. Entry 0 is exactly 1.0.
    portamento_coefficient: [f32; PORTAMENTO_TABLE_SIZE],
}

impl Tables {
    /// Build the tables for the given sample rate.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is not a positive finite number.
    pub fn new(sample_rate: f32) -> Self {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive"
        );

        let mut segment_frequency = [0.0; RATE_TABLE_SIZE];
        let time_range = MAX_SEGMENT_TIME / MIN_SEGMENT_TIME;
        for (i, entry) in segment_frequency.iter_mut().enumerate() {
            let x = i as f32 / (RATE_TABLE_SIZE - 1) as f32;
            let seconds = MIN_SEGMENT_TIME * powf(time_range, x);
            *entry = (1.0 / (seconds * sample_rate)).min(1.0);
        }

        let mut portamento_coefficient = [1.0; PORTAMENTO_TABLE_SIZE];
        let lag_range = MAX_PORTAMENTO_TIME / MIN_PORTAMENTO_TIME;
        for (i, entry) in portamento_coefficient.iter_mut().enumerate().skip(1) {
            let x = i as f32 / (PORTAMENTO_TABLE_SIZE - 1) as f32;
            let seconds = MIN_PORTAMENTO_TIME * powf(lag_range, x);
            *entry = 1.0 - expf(-1.0 / (seconds * sample_rate));
        }

        Self {
            sample_rate,
            segment_frequency,
            portamento_coefficient,
        }
    }

    /// Sample rate the tables were built for.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Phase increment per sample for a segment rate knob.
    ///
    /// Out-of-range and non-finite knobs are clamped, so the result is always
    /// in (0, 1].
    #[inline]
    pub fn rate_to_frequency(&self, rate: f32) -> f32 {
        lookup(&self.segment_frequency, rate)
    }

    /// One-pole coefficient for a lag knob. 0.0 yields exactly 1.0 (no lag).
    #[inline]
    pub fn portamento_to_coefficient(&self, rate: f32) -> f32 {
        lookup(&self.portamento_coefficient, rate)
    }
}

/// Linear interpolation into a table covering x in [0, 1].
#[inline]
fn lookup(table: &[f32], x: f32) -> f32 {
    let last = table.len() - 1;
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    let scaled = x * last as f32;
    let index = (scaled as usize).min(last - 1);
    let frac = scaled - index as f32;
    crossfade(table[index], table[index + 1], frac)
}
