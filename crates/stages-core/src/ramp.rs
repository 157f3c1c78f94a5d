//! Clock-to-ramp extraction for tap-tempo LFOs.
//!
//! [`RampExtractor`] watches a stream of gate flags and produces a phase
//! ramp in [0, 1) locked to the clock, multiplied or divided by a
//! [`Ratio`]. Between clock edges the ramp free-runs at a predicted rate, so
//! a steady clock gives a steady ramp and an irregular one gives the best
//! guess of several predictors:
//!
//! - slow and fast moving averages of the period
//! - periodicity detectors assuming the rhythm repeats every 1 to 4 pulses
//!
//! Each predictor is scored on how well it guessed the last period; the most
//! trusted one drives the ramp. When the clock's pulse width has been
//! steady, the falling edge is used to correct the rate mid-period.
//!
//! A pause longer than three seconds (or four predicted periods) is treated
//! as a stopped clock: the next pulse restarts the ramp from zero.

use crate::gate::GateFlags;
use crate::math::{one_pole, slope};
use crate::ratio::Ratio;

const HISTORY_SIZE: usize = 16;
const PULSE_WIDTH_TOLERANCE: f32 = 0.05;
const MAX_RAMP_VALUE: f32 = 0.9999;
const MIN_ON_DURATION: u32 = 32;

const SLOW_MOVING_AVERAGE: usize = 0;
const FAST_MOVING_AVERAGE: usize = 1;
const PERIOD_1: usize = 2;
const NUM_PREDICTORS: usize = 6;

#[derive(Clone, Copy, Debug)]
struct Pulse {
    on_duration: u32,
    total_duration: u32,
    pulse_width: f32,
}

/// Extracts a ratio-scaled phase ramp from a clock's gate flags.
#[derive(Debug, Clone)]
pub struct RampExtractor {
    sample_rate: f32,
    max_frequency: f32,

    train_phase: f32,
    frequency: f32,
    max_train_phase: f32,
    next_max_train_phase: f32,
    f_ratio: f32,
    next_f_ratio: f32,
    reset_counter: u32,
    reset_interval: u32,

    history: [Pulse; HISTORY_SIZE],
    current_pulse: usize,
    average_pulse_width: f32,
    predicted_period: [f32; NUM_PREDICTORS],
    prediction_accuracy: [f32; NUM_PREDICTORS],
}

impl RampExtractor {
    /// Create an extractor. `max_frequency` caps the ramp rate, in cycles
    /// per sample.
    pub fn new(sample_rate: f32, max_frequency: f32) -> Self {
        let mut extractor = Self {
            sample_rate,
            max_frequency,
            train_phase: 0.0,
            frequency: 0.0,
            max_train_phase: 0.0,
            next_max_train_phase: 0.0,
            f_ratio: 0.0,
            next_f_ratio: 0.0,
            reset_counter: 0,
            reset_interval: 0,
            history: [Pulse {
                on_duration: 0,
                total_duration: 0,
                pulse_width: 0.0,
            }; HISTORY_SIZE],
            current_pulse: 0,
            average_pulse_width: 0.0,
            predicted_period: [0.0; NUM_PREDICTORS],
            prediction_accuracy: [0.0; NUM_PREDICTORS],
        };
        extractor.reset();
        extractor
    }

    /// Forget the clock history.
    pub fn reset(&mut self) {
        let default_period = (self.sample_rate * 0.125).max(1.0);
        self.train_phase = 0.0;
        self.frequency = 1.0 / default_period;
        self.max_train_phase = 0.999;
        self.next_max_train_phase = 0.999;
        self.f_ratio = 1.0;
        self.next_f_ratio = 1.0;
        self.reset_counter = 1;
        self.reset_interval = self.long_pause();

        let pulse = Pulse {
            on_duration: (default_period * 0.5) as u32,
            total_duration: default_period as u32,
            pulse_width: 0.5,
        };
        self.history = [pulse; HISTORY_SIZE];
        self.current_pulse = 0;
        self.average_pulse_width = 0.0;
        self.predicted_period = [default_period; NUM_PREDICTORS];
        self.prediction_accuracy = [0.0; NUM_PREDICTORS];
    }

    /// Advance one sample.
    #[inline]
    pub fn tick(&mut self, ratio: Ratio, flags: GateFlags) -> f32 {
        if flags.is_rising() {
            self.on_rising_edge(ratio);
        }

        let pulse = &mut self.history[self.current_pulse];
        pulse.total_duration = pulse.total_duration.saturating_add(1);
        if flags.is_high() {
            pulse.on_duration = pulse.on_duration.saturating_add(1);
        }

        // With a steady pulse width, the falling edge tells us how far into
        // the period we are.
        if flags.is_falling() && self.average_pulse_width > 0.0 {
            let t_on = self.history[self.current_pulse].on_duration.max(1) as f32;
            let next = self.max_train_phase - self.reset_counter as f32 + 1.0;
            let pw = self.average_pulse_width;
            self.frequency = ((next - self.train_phase).max(0.0) * pw / ((1.0 - pw) * t_on))
                .min(self.max_frequency);
        }

        self.train_phase += self.frequency;
        if self.train_phase >= self.max_train_phase {
            if self.frequency >= self.max_frequency {
                self.train_phase -= self.max_train_phase;
            } else {
                self.train_phase = self.max_train_phase;
            }
        }

        let output = self.train_phase * self.f_ratio;
        output - libm::floorf(output)
    }

    fn on_rising_edge(&mut self, ratio: Ratio) {
        let p = self.history[self.current_pulse];
        if p.total_duration >= self.reset_interval {
            // Long pause: the clock was stopped and restarted.
            self.train_phase = 0.0;
            self.reset_counter = ratio.q.max(1);
            self.reset_interval = p.total_duration.saturating_mul(4);
        } else {
            let period = p.total_duration.max(1) as f32;
            self.history[self.current_pulse].pulse_width = p.on_duration as f32 / period;
            self.average_pulse_width = if p.on_duration < MIN_ON_DURATION {
                0.0
            } else {
                self.average_pulse_width(PULSE_WIDTH_TOLERANCE)
            };

            let predicted = self.predict_next_period();
            self.frequency = (1.0 / predicted.max(1.0)).min(self.max_frequency);

            self.reset_counter = self.reset_counter.saturating_sub(1);
            if self.reset_counter == 0 {
                self.next_f_ratio = ratio.to_float() * MAX_RAMP_VALUE;
                self.next_max_train_phase = ratio.q as f32;
                self.train_phase = 0.0;
                self.f_ratio = self.next_f_ratio;
                self.max_train_phase = self.next_max_train_phase;
                self.reset_counter = ratio.q.max(1);
            } else {
                let expected = self.max_train_phase - self.reset_counter as f32;
                let warp = expected - self.train_phase + 1.0;
                self.frequency *= warp.max(0.01);
            }

            self.reset_interval = (4.0 * predicted).max(self.long_pause() as f32) as u32;
            self.current_pulse = (self.current_pulse + 1) % HISTORY_SIZE;
        }
        let next = &mut self.history[self.current_pulse];
        next.on_duration = 0;
        next.total_duration = 0;
    }

    fn average_pulse_width(&self, tolerance: f32) -> f32 {
        let reference = self.history[self.current_pulse].pulse_width;
        let mut sum = 0.0;
        for pulse in &self.history {
            let pw = pulse.pulse_width;
            if pw < reference * (1.0 - tolerance) || pw > reference * (1.0 + tolerance) {
                return 0.0;
            }
            sum += pw;
        }
        sum / HISTORY_SIZE as f32
    }

    fn predict_next_period(&mut self) -> f32 {
        let last_period = self.history[self.current_pulse].total_duration as f32;
        let mut best = FAST_MOVING_AVERAGE;

        for i in 0..NUM_PREDICTORS {
            let error = (self.predicted_period[i] - last_period) / (last_period + 0.01);
            // 10% error scores half as well as a perfect guess.
            let accuracy = 1.0 / (1.0 + 100.0 * error * error);
            slope(&mut self.prediction_accuracy[i], accuracy, 0.1, 0.5);

            match i {
                SLOW_MOVING_AVERAGE => one_pole(&mut self.predicted_period[i], last_period, 0.1),
                FAST_MOVING_AVERAGE => one_pole(&mut self.predicted_period[i], last_period, 0.5),
                _ => {
                    let candidate_period = i - PERIOD_1 + 1;
                    let t = (self.current_pulse + 1 + HISTORY_SIZE - candidate_period) % HISTORY_SIZE;
                    self.predicted_period[i] = self.history[t].total_duration as f32;
                }
            }

            if self.prediction_accuracy[i] >= self.prediction_accuracy[best] {
                best = i;
            }
        }
        self.predicted_period[best]
    }

    fn long_pause(&self) -> u32 {
        (self.sample_rate * 3.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::DIVIDER_RATIOS;

    const SR: f32 = 32000.0;

    fn clock(period: usize, pulses: usize) -> Vec<GateFlags> {
        let mut previous = GateFlags::LOW;
        (0..period * pulses)
            .map(|i| {
                previous = previous.extract(i % period < period / 2);
                previous
            })
            .collect()
    }

    fn render(extractor: &mut RampExtractor, ratio: Ratio, flags: &[GateFlags]) -> Vec<f32> {
        flags.iter().map(|&f| extractor.tick(ratio, f)).collect()
    }

    fn unity() -> Ratio {
        DIVIDER_RATIOS[3]
    }

    #[test]
    fn ramp_stays_in_unit_interval() {
        let mut extractor = RampExtractor::new(SR, 0.1);
        let flags = clock(400, 20);
        let ramp = render(&mut extractor, unity(), &flags);
        assert!(ramp.iter().all(|r| (0.0..1.0).contains(r)));
    }

    #[test]
    fn locks_to_steady_clock() {
        let period = 400;
        let mut extractor = RampExtractor::new(SR, 0.1);
        let flags = clock(period, 40);
        let ramp = render(&mut extractor, unity(), &flags);

        // After settling, the ramp should be near its end just before each
        // clock edge and restart near zero on it.
        let last_edge = period * 39;
        assert!(ramp[last_edge - 1] > 0.9, "got {}", ramp[last_edge - 1]);
        assert!(ramp[last_edge + 1] < 0.1, "got {}", ramp[last_edge + 1]);
        let mid = ramp[last_edge - period / 2];
        assert!((mid - 0.5).abs() < 0.1, "got {mid}");
    }

    #[test]
    fn multiplier_cycles_faster() {
        let period = 400;
        let mut extractor = RampExtractor::new(SR, 0.1);
        let flags = clock(period, 40);
        let ramp = render(&mut extractor, DIVIDER_RATIOS[4], &flags);

        let start = period * 38;
        let wraps = ramp[start..start + period]
            .windows(2)
            .filter(|w| w[1] < w[0] - 0.5)
            .count();
        assert!(wraps >= 1, "x2 should wrap inside one clock period");
    }
}
