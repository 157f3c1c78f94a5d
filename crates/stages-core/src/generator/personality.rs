//! Single-stage renderers.
//!
//! Each one reads stage 0's knobs and owns the generator state while it is
//! selected. Knobs fed straight to the output are interpolated across the
//! block; rates and coefficients are looked up once per block.

use super::SegmentGenerator;
use crate::gate::GateFlags;
use crate::math::{one_pole, semitones_to_ratio};
use crate::param::BlockInterpolator;
use crate::ratio::DIVIDER_RATIOS;
use crate::segment::{DELAY_CAPACITY, Output};
use crate::shape::{LfoShape, warp_phase};

/// Length of the forced-low gap when a pulse is retriggered while high.
const RETRIG_DELAY_SAMPLES: u32 = 32;

/// Free-running LFO frequency with the rate knob centered, in Hz.
const LFO_BASE_FREQUENCY: f32 = 2.043_949_7;

/// Ratio knob headroom so the top ratio is reachable.
const RATIO_KNOB_SCALE: f32 = 1.03;

impl SegmentGenerator<'_> {
    pub(super) fn process_zero(&mut self, out: &mut [Output]) {
        self.value = 0.0;
        self.active_segment = 1;
        out.fill(Output {
            value: 0.0,
            phase: 0.5,
            segment: 1,
        });
    }

    pub(super) fn process_decay_envelope(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let frequency = self.tables.rate_to_frequency(self.parameters[0].primary);
        let curve = self.parameters[0].secondary;

        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            if flags.is_rising() {
                self.phase = 0.0;
                self.active_segment = 0;
            }
            self.phase += frequency;
            if self.phase >= 1.0 {
                self.phase = 1.0;
                self.active_segment = 1;
            }
            self.value = 1.0 - warp_phase(self.phase, curve);
            self.lp = self.value;
            *out = Output {
                value: self.lp,
                phase: self.phase,
                segment: self.active_segment,
            };
        }
    }

    pub(super) fn process_timed_pulse(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let frequency = self.tables.rate_to_frequency(self.parameters[0].secondary);
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            if flags.is_rising() {
                self.retrig_delay = if self.active_segment == 0 {
                    RETRIG_DELAY_SAMPLES
                } else {
                    0
                };
                self.phase = 0.0;
                self.active_segment = 0;
            }
            self.retrig_delay = self.retrig_delay.saturating_sub(1);

            self.phase += frequency;
            if self.phase >= 1.0 {
                self.phase = 1.0;
                self.active_segment = 1;
            }

            let p = primary.next();
            self.value = if self.active_segment == 0 && self.retrig_delay == 0 {
                p
            } else {
                0.0
            };
            self.lp = self.value;
            *out = Output {
                value: self.lp,
                phase: self.phase,
                segment: self.active_segment,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_gate(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            self.active_segment = usize::from(!flags.is_high());
            let p = primary.next();
            self.value = if flags.is_high() { p } else { 0.0 };
            self.lp = self.value;
            *out = Output {
                value: self.lp,
                phase: 0.5,
                segment: self.active_segment,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_sample_and_hold(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let coefficient = self
            .tables
            .portamento_to_coefficient(self.parameters[0].secondary);
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            let p = primary.next();
            if flags.is_rising() {
                self.value = p;
            }
            self.active_segment = usize::from(!flags.is_high());
            one_pole(&mut self.lp, self.value, coefficient);
            *out = Output {
                value: self.lp,
                phase: 0.5,
                segment: self.active_segment,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_clocked_sample_and_hold(&mut self, out: &mut [Output]) {
        let frequency = self.tables.rate_to_frequency(self.parameters[0].secondary);
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        for out in out.iter_mut() {
            self.phase += frequency;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
                // Sample the knob where it was at the instant of the wrap.
                let reset_time = self.phase / frequency;
                self.value = primary.subsample(1.0 - reset_time);
            }
            primary.next();
            self.active_segment = usize::from(self.phase >= 0.5);
            *out = Output {
                value: self.value,
                phase: self.phase,
                segment: self.active_segment,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_tap_lfo(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let ratio = self
            .ratio_quantizer
            .lookup(&DIVIDER_RATIOS, self.parameters[0].primary * RATIO_KNOB_SCALE);
        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            out.phase = self.ramp_extractor.tick(ratio, flags);
        }
        self.shape_lfo(out);
    }

    pub(super) fn process_free_running_lfo(&mut self, out: &mut [Output]) {
        let semitones = (96.0 * (self.parameters[0].primary - 0.5)).clamp(-128.0, 127.0);
        let frequency =
            semitones_to_ratio(semitones) * LFO_BASE_FREQUENCY / self.tables.sample_rate();

        for out in out.iter_mut() {
            self.phase += frequency;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            out.phase = self.phase;
        }
        self.shape_lfo(out);
    }

    pub(super) fn process_delay(&mut self, out: &mut [Output]) {
        let max_delay = (DELAY_CAPACITY - 1) as f32;
        let mut delay_time = semitones_to_ratio(2.0 * (self.parameters[0].secondary - 0.5) * 36.0)
            * 0.5
            * self.tables.sample_rate();
        let mut clock_frequency = 1.0;
        let delay_frequency = 1.0 / delay_time;

        // Longer than the line: slow the write clock down instead.
        if delay_time >= max_delay {
            clock_frequency = max_delay * delay_frequency;
            delay_time = max_delay;
        }
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        for out in out.iter_mut() {
            self.phase += clock_frequency;
            one_pole(&mut self.lp, primary.next(), clock_frequency);
            if self.phase >= 1.0 {
                self.phase -= 1.0;
                self.delay_line.write(self.lp);
            }

            self.aux += delay_frequency;
            if self.aux >= 1.0 {
                self.aux -= 1.0;
            }
            self.active_segment = usize::from(self.aux >= 0.5);

            let delayed = self.delay_line.read(delay_time - self.phase - 1.0);
            one_pole(&mut self.value, delayed, clock_frequency);
            *out = Output {
                value: self.value,
                phase: self.aux,
                segment: self.active_segment,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_portamento(&mut self, out: &mut [Output]) {
        let coefficient = self
            .tables
            .portamento_to_coefficient(self.parameters[0].secondary);
        let mut primary = BlockInterpolator::new(self.primary, self.parameters[0].primary, out.len());

        self.active_segment = 0;
        for out in out.iter_mut() {
            self.value = primary.next();
            one_pole(&mut self.lp, self.value, coefficient);
            *out = Output {
                value: self.lp,
                phase: 0.5,
                segment: 0,
            };
        }
        self.primary = primary.value();
    }

    pub(super) fn process_follower(&mut self, monitored_segment: usize, out: &mut [Output]) {
        for out in out.iter_mut() {
            let active = out.segment == monitored_segment;
            self.active_segment = usize::from(!active);
            out.value = if active { 1.0 - out.phase } else { 0.0 };
        }
    }

    fn shape_lfo(&mut self, out: &mut [Output]) {
        let shape = LfoShape::new(self.parameters[0].secondary);
        for out in out.iter_mut() {
            let (value, segment) = shape.apply(out.phase);
            out.value = value;
            out.segment = segment;
        }
        if let Some(last) = out.last() {
            self.active_segment = last.segment;
        }
    }
}
