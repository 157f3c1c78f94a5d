//! Small math helpers shared by the generator and its collaborators.
//!
//! All functions are allocation-free and `no_std` friendly.
//!
//! - [`crossfade`] - Linear interpolation between two values
//! - [`one_pole`] - In-place one-pole lowpass step
//! - [`slope`] - One-pole step with separate rise and fall coefficients
//! - [`semitones_to_ratio`] - Pitch interval to frequency ratio
//! - [`flush_denormal`] - Subnormal protection for feedback paths

use libm::exp2f;

/// Linear interpolation between two values.
///
/// # Arguments
/// * `a` - Start value (at t=0)
/// * `b` - End value (at t=1)
/// * `t` - Interpolation factor (0.0 to 1.0)
#[inline]
pub fn crossfade(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Advance a one-pole lowpass by one sample, in place.
///
/// `state += coefficient * (input - state)`. A coefficient of 1.0 passes the
/// input through unchanged; smaller coefficients lag behind it.
#[inline]
pub fn one_pole(state: &mut f32, input: f32, coefficient: f32) {
    *state = flush_denormal(*state + coefficient * (input - *state));
}

/// One-pole step using `up` while the target is above the state, `down`
/// otherwise.
#[inline]
pub fn slope(state: &mut f32, input: f32, up: f32, down: f32) {
    let error = input - *state;
    *state += if error > 0.0 { up } else { down } * error;
}

/// Convert an interval in semitones to a frequency ratio.
///
/// ```rust
/// use stages_core::math::semitones_to_ratio;
///
/// assert!((semitones_to_ratio(12.0) - 2.0).abs() < 1e-5);
/// assert!((semitones_to_ratio(-24.0) - 0.25).abs() < 1e-6);
/// ```
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    exp2f(semitones / 12.0)
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Lag filters decay toward their target indefinitely; values below 1e-20
/// are replaced with zero before they reach the IEEE 754 subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossfade() {
        assert_eq!(crossfade(0.0, 10.0, 0.0), 0.0);
        assert_eq!(crossfade(0.0, 10.0, 0.5), 5.0);
        assert_eq!(crossfade(0.0, 10.0, 1.0), 10.0);
        assert_eq!(crossfade(1.0, 0.0, 0.25), 0.75);
    }

    #[test]
    fn test_one_pole_unity_coefficient_passes_input() {
        let mut state = 0.3;
        one_pole(&mut state, 0.8, 1.0);
        assert_eq!(state, 0.8);
    }

    #[test]
    fn test_one_pole_lags_behind_input() {
        let mut state = 0.0;
        one_pole(&mut state, 1.0, 0.1);
        assert!((state - 0.1).abs() < 1e-6);
        for _ in 0..200 {
            one_pole(&mut state, 1.0, 0.1);
        }
        assert!((state - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_slope_asymmetric() {
        let mut state = 0.0;
        slope(&mut state, 1.0, 0.5, 0.1);
        assert!((state - 0.5).abs() < 1e-6);
        slope(&mut state, 0.0, 0.5, 0.1);
        assert!((state - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
