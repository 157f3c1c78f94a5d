//! Clock divider / multiplier ratios and their knob quantizer.
//!
//! The tap-tempo LFO follows an external clock at a musical ratio chosen
//! with the primary knob. The quantizer adds hysteresis so a knob resting
//! near a boundary between two ratios does not flicker between them.

/// A clock ratio: output cycles per input pulse, and the number of input
/// pulses (`q`) after which the output phase realigns with the clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ratio {
    /// Output cycles per input pulse. Kept slightly below the exact value so
    /// the extracted phase never wraps early.
    pub ratio: f32,
    /// Realignment period, in input pulses.
    pub q: u32,
}

impl Ratio {
    /// Ratio as a plain multiplier.
    #[inline]
    pub fn to_float(self) -> f32 {
        self.ratio
    }
}

/// Divider and multiplier ratios selectable by the tap LFO: /4, /3, /2, x1,
/// x2, x3, x4.
pub const DIVIDER_RATIOS: [Ratio; 7] = [
    Ratio { ratio: 0.249999, q: 4 },
    Ratio { ratio: 0.333333, q: 3 },
    Ratio { ratio: 0.499999, q: 2 },
    Ratio { ratio: 0.999999, q: 1 },
    Ratio { ratio: 1.999999, q: 1 },
    Ratio { ratio: 2.999999, q: 1 },
    Ratio { ratio: 3.999999, q: 1 },
];

/// Width of the dead zone around each boundary, in steps.
const HYSTERESIS: f32 = 0.25;

/// Nearest-candidate quantizer with hysteresis.
#[derive(Debug, Clone, Default)]
pub struct RatioQuantizer {
    index: usize,
}

impl RatioQuantizer {
    /// Create a quantizer resting on the first candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current selection.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Quantize `value` (nominally [0, 1]) to an index into `num_steps`
    /// candidates.
    pub fn process(&mut self, value: f32, num_steps: usize) -> usize {
        if num_steps < 2 {
            self.index = 0;
            return 0;
        }
        let last = num_steps - 1;
        let scaled = if value.is_nan() { 0.0 } else { value * last as f32 };
        let current = self.index.min(last) as f32;
        let hysteresis = if scaled > current { -HYSTERESIS } else { HYSTERESIS };
        let candidate = (scaled + hysteresis + 0.5).clamp(0.0, last as f32);
        self.index = candidate as usize;
        self.index
    }

    /// Quantize `value` and return the selected candidate.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty.
    pub fn lookup<T: Copy>(&mut self, candidates: &[T], value: f32) -> T {
        candidates[self.process(value, candidates.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_select_extreme_ratios() {
        let mut q = RatioQuantizer::new();
        assert_eq!(q.lookup(&DIVIDER_RATIOS, 0.0).q, 4);
        assert_eq!(q.lookup(&DIVIDER_RATIOS, 1.0).ratio, 3.999999);
    }

    #[test]
    fn center_selects_unity() {
        let mut q = RatioQuantizer::new();
        let r = q.lookup(&DIVIDER_RATIOS, 0.5);
        assert_eq!(r.q, 1);
        assert!((r.to_float() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hysteresis_holds_near_boundary() {
        let mut q = RatioQuantizer::new();
        // Settle on step 3 (x1), then wiggle just past the 3/4 boundary.
        assert_eq!(q.process(0.5, 7), 3);
        let boundary = 3.5 / 6.0;
        assert_eq!(q.process(boundary + 0.01, 7), 3);
        // Well past the dead zone it moves.
        assert_eq!(q.process(boundary + 0.06, 7), 4);
        // And coming back just below the boundary it stays.
        assert_eq!(q.process(boundary - 0.01, 7), 4);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let mut q = RatioQuantizer::new();
        assert_eq!(q.process(-2.0, 7), 0);
        assert_eq!(q.process(9.0, 7), 6);
        assert_eq!(q.process(f32::NAN, 7), 0);
    }
}
