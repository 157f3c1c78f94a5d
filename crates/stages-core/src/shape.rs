//! Stateless shaping functions: curve warping for segments and the LFO
//! waveform shaper.
//!
//! # Phase warp
//!
//! [`warp_phase`] bends a linear ramp. A curve knob of 0.5 is the identity;
//! moving it away from the center bends the ramp toward a fast start
//! (above 0.5) or a slow start (below 0.5), mirrored about the midpoint.
//!
//! # LFO shaper
//!
//! [`LfoShape`] maps a phase to a unipolar waveform. The shape knob sweeps
//! continuously through:
//!
//! | Knob | Waveform |
//! |------|----------|
//! | 0.0 | falling saw |
//! | 0.0 - 0.36 | asymmetric triangle, widening toward symmetric |
//! | 0.36 - 0.5 | triangle blending into sine |
//! | 0.5 | sine |
//! | 0.5 - 0.64 | sine blending back into triangle |
//! | 0.64 - 1.0 | triangle with growing plateaus, square at 1.0 |

use crate::math::crossfade;
use core::f32::consts::TAU;
use libm::sinf;

/// Warp a linear phase in [0, 1] with a curve knob in [0, 1].
///
/// ```rust
/// use stages_core::shape::warp_phase;
///
/// assert_eq!(warp_phase(0.3, 0.5), 0.3);
/// assert!(warp_phase(0.3, 1.0) > 0.3);
/// assert!(warp_phase(0.3, 0.0) < 0.3);
/// ```
#[inline]
pub fn warp_phase(t: f32, curve: f32) -> f32 {
    let curve = curve - 0.5;
    let flip = curve < 0.0;
    let t = if flip { 1.0 - t } else { t };
    let a = 128.0 * curve * curve;
    let warped = (1.0 + a) * t / (1.0 + a * t);
    if flip { 1.0 - warped } else { warped }
}

/// Waveform shaper coefficients derived from one shape knob position.
///
/// Building the coefficients costs a division or two, so generators build
/// one per block and apply it to every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoShape {
    slope: f32,
    slope_up: f32,
    slope_down: f32,
    plateau: f32,
    normalization: f32,
    phase_shift: f32,
    sine_amount: f32,
}

impl LfoShape {
    /// Derive the shaper for a knob position in [0, 1].
    pub fn new(shape: f32) -> Self {
        let shape = shape - 0.5;
        let shape = 2.0 + 9.999999 * shape / (1.0 + 3.0 * shape.abs());

        let slope = (shape * 0.5).min(0.5);
        let plateau_width = (shape - 3.0).max(0.0);
        let sine_amount = if shape < 2.0 { shape - 1.0 } else { 3.0 - shape }.max(0.0);
        let plateau = 0.5 * (1.0 - plateau_width);

        Self {
            slope,
            slope_up: 1.0 / slope,
            slope_down: 1.0 / (1.0 - slope),
            plateau,
            normalization: 1.0 / plateau,
            phase_shift: plateau_width * 0.25,
            sine_amount,
        }
    }

    /// Shape one phase value.
    ///
    /// Returns the waveform value in [0, 1] and the sub-state: 0 while in the
    /// first half of the (shifted) cycle, 1 in the second half.
    #[inline]
    pub fn apply(&self, phase: f32) -> (f32, usize) {
        let mut phase = phase - self.phase_shift;
        if phase < 0.0 {
            phase += 1.0;
        }
        let triangle = if phase < self.slope {
            self.slope_up * phase
        } else {
            1.0 - (phase - self.slope) * self.slope_down
        };
        let triangle = (triangle - 0.5).clamp(-self.plateau, self.plateau) * self.normalization;
        let sine = sinf(TAU * (phase + 0.75));
        let value = 0.5 * crossfade(triangle, sine, self.sine_amount) + 0.5;
        (value, usize::from(phase >= 0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warp_is_identity_at_center() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert!((warp_phase(t, 0.5) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn warp_preserves_endpoints() {
        for curve in [0.0, 0.2, 0.5, 0.8, 1.0] {
            assert!(warp_phase(0.0, curve).abs() < 1e-6);
            assert!((warp_phase(1.0, curve) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn warp_is_mirrored_about_center() {
        for i in 1..10 {
            let t = i as f32 / 10.0;
            let up = warp_phase(t, 0.8);
            let down = warp_phase(1.0 - t, 0.2);
            assert!((up - (1.0 - down)).abs() < 1e-5);
        }
    }

    #[test]
    fn warp_is_monotonic() {
        for curve in [0.0, 0.25, 0.75, 1.0] {
            let mut previous = -1.0;
            for i in 0..=100 {
                let w = warp_phase(i as f32 / 100.0, curve);
                assert!(w >= previous);
                previous = w;
            }
        }
    }

    #[test]
    fn shaper_stays_unipolar() {
        for s in 0..=10 {
            let shape = LfoShape::new(s as f32 / 10.0);
            for p in 0..200 {
                let (value, segment) = shape.apply(p as f32 / 200.0);
                assert!(
                    (-1e-4..=1.0 + 1e-4).contains(&value),
                    "shape {s} phase {p} out of range: {value}"
                );
                assert!(segment <= 1);
            }
        }
    }

    #[test]
    fn shaper_center_is_sine() {
        let shape = LfoShape::new(0.5);
        let (bottom, _) = shape.apply(0.0);
        let (top, _) = shape.apply(0.5);
        let (middle, _) = shape.apply(0.25);
        assert!(bottom < 1e-3);
        assert!((top - 1.0).abs() < 1e-3);
        assert!((middle - 0.5).abs() < 1e-3);
    }

    #[test]
    fn shaper_reports_half_cycle() {
        let shape = LfoShape::new(0.5);
        assert_eq!(shape.apply(0.1).1, 0);
        assert_eq!(shape.apply(0.9).1, 1);
    }
}
