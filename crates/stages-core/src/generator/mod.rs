//! The segment generator: one channel's runtime state and render loop.
//!
//! A [`SegmentGenerator`] is configured rarely, whenever the front panel or
//! the gate patching changes, and rendered once per block. Configuration
//! picks a [`Program`]:
//!
//! - several stages compile into a [`SegmentTable`] walked sample by sample
//! - a lone stage selects a [`Personality`], a specialized single-purpose
//!   renderer (envelope, LFO, sample and hold, delay, ...)
//!
//! Rendering never allocates and never fails. Knobs are bound by reference
//! through [`Cell`](crate::Cell)s, so [`set_segment_parameters`] may be
//! called every block without reconfiguring.
//!
//! # Example
//!
//! ```rust
//! use stages_core::{GateFlags, Output, SegmentGenerator, StageConfig, StageKind, Tables};
//!
//! let tables = Tables::new(48000.0);
//! let mut generator = SegmentGenerator::new(&tables);
//!
//! // Attack / release envelope
//! generator.configure(true, &[StageConfig::new(StageKind::Ramp), StageConfig::new(StageKind::Ramp)]);
//! generator.set_segment_parameters(0, 0.1, 0.5);
//! generator.set_segment_parameters(1, 0.3, 0.5);
//!
//! let mut flags = [GateFlags::LOW; 8];
//! flags[0] = GateFlags::HIGH | GateFlags::RISING;
//! let mut out = [Output::default(); 8];
//! generator.process(&flags, &mut out);
//! assert_eq!(out[0].segment, 0);
//! assert!(out[7].value > out[1].value);
//! ```
//!
//! [`set_segment_parameters`]: SegmentGenerator::set_segment_parameters

mod personality;

use crate::compiler::SegmentTable;
use crate::delay::FixedDelayLine;
use crate::gate::GateFlags;
use crate::math::{crossfade, one_pole};
use crate::ramp::RampExtractor;
use crate::ratio::RatioQuantizer;
use crate::segment::{
    DELAY_CAPACITY, MAX_SEGMENTS, Output, Parameters, Personality, Program, StageConfig,
};
use crate::shape::warp_phase;
use crate::tables::Tables;

/// Highest tap-tempo ramp rate, in Hz.
const MAX_TAP_FREQUENCY: f32 = 1000.0;

/// Multi-mode segment generator for one channel.
#[derive(Debug, Clone)]
pub struct SegmentGenerator<'t> {
    tables: &'t Tables,
    program: Program,
    table: SegmentTable,
    num_segments: usize,
    parameters: [Parameters; MAX_SEGMENTS],

    phase: f32,
    aux: f32,
    start: f32,
    value: f32,
    lp: f32,
    primary: f32,
    active_segment: usize,
    retrig_delay: u32,

    ratio_quantizer: RatioQuantizer,
    ramp_extractor: RampExtractor,
    delay_line: FixedDelayLine<DELAY_CAPACITY>,
}

impl<'t> SegmentGenerator<'t> {
    /// Create a silent, unconfigured generator reading from `tables`.
    pub fn new(tables: &'t Tables) -> Self {
        let sample_rate = tables.sample_rate();
        Self {
            tables,
            program: Program::MultiSegment,
            table: SegmentTable::default(),
            num_segments: 0,
            parameters: [Parameters::default(); MAX_SEGMENTS],
            phase: 0.0,
            aux: 0.0,
            start: 0.0,
            value: 0.0,
            lp: 0.0,
            primary: 0.0,
            active_segment: 0,
            retrig_delay: 0,
            ratio_quantizer: RatioQuantizer::new(),
            ramp_extractor: RampExtractor::new(sample_rate, MAX_TAP_FREQUENCY / sample_rate),
            delay_line: FixedDelayLine::new(),
        }
    }

    /// Rebuild the program from a list of stages.
    ///
    /// `has_trigger` tells whether the channel's gate input is patched; it
    /// only matters for a lone stage, where it picks between the free-running
    /// and the triggered personalities.
    ///
    /// After a multi-stage configuration the generator parks on the table's
    /// sentinel until the first gate edge.
    ///
    /// # Panics
    ///
    /// Panics if `stages` is empty or longer than [`MAX_SEGMENTS`].
    pub fn configure(&mut self, has_trigger: bool, stages: &[StageConfig]) {
        if let [stage] = stages {
            self.configure_personality(Personality::select(*stage, has_trigger));
            self.num_segments = 1;
            return;
        }
        self.table = SegmentTable::compile(stages);
        self.num_segments = self.table.num_segments();
        self.program = Program::MultiSegment;
        self.active_segment = self.table.sentinel();
    }

    /// Run a single personality, bypassing the stage declarations.
    ///
    /// This is how the personalities that no stage combination selects, like
    /// [`Personality::ClockedSampleAndHold`], are reached.
    pub fn configure_personality(&mut self, personality: Personality) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?personality, "selected personality");

        let program = Program::Single(personality);
        if self.program != program {
            // A newly selected personality starts without old echoes or clock history.
            self.delay_line.clear();
            self.ratio_quantizer.reset();
            self.ramp_extractor.reset();
        }
        self.program = program;
        self.num_segments = 1;
    }

    /// Turn this generator into a follower of segment `monitored_segment`
    /// of another generator.
    ///
    /// The caller copies the monitored generator's output block into this
    /// generator's output buffer before [`process`](Self::process); the
    /// follower rewrites only the values, as `1 - phase` while the segment is
    /// active and 0 otherwise.
    pub fn configure_follower(&mut self, monitored_segment: usize) {
        self.configure_personality(Personality::Follower { monitored_segment });
        self.num_segments = 0;
    }

    /// Bind the knobs of stage `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_SEGMENTS`.
    #[inline]
    pub fn set_segment_parameters(&mut self, index: usize, primary: f32, secondary: f32) {
        self.parameters[index] = Parameters { primary, secondary };
    }

    /// Render one block.
    ///
    /// `gate_flags` and `out` must have the same length. Followers read
    /// `out` as input.
    pub fn process(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        debug_assert_eq!(gate_flags.len(), out.len(), "block length mismatch");
        if out.is_empty() {
            return;
        }
        match self.program {
            Program::MultiSegment => self.process_multi_segment(gate_flags, out),
            Program::Single(personality) => match personality {
                Personality::Zero => self.process_zero(out),
                Personality::DecayEnvelope => self.process_decay_envelope(gate_flags, out),
                Personality::TimedPulse => self.process_timed_pulse(gate_flags, out),
                Personality::Gate => self.process_gate(gate_flags, out),
                Personality::SampleAndHold => self.process_sample_and_hold(gate_flags, out),
                Personality::ClockedSampleAndHold => self.process_clocked_sample_and_hold(out),
                Personality::TapLfo => self.process_tap_lfo(gate_flags, out),
                Personality::FreeRunningLfo => self.process_free_running_lfo(out),
                Personality::Delay => self.process_delay(out),
                Personality::Portamento => self.process_portamento(out),
                Personality::Follower { monitored_segment } => {
                    self.process_follower(monitored_segment, out);
                }
            },
        }
    }

    /// Active program.
    pub fn program(&self) -> Program {
        self.program
    }

    /// Compiled table of the last multi-stage configuration.
    pub fn segment_table(&self) -> &SegmentTable {
        &self.table
    }

    /// Number of configured stages: 0 for a follower, 1 for a personality.
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// Index of the active segment.
    pub fn active_segment(&self) -> usize {
        self.active_segment
    }

    /// Knobs of stage `index`.
    pub fn parameters(&self, index: usize) -> Parameters {
        self.parameters[index]
    }

    fn process_multi_segment(&mut self, gate_flags: &[GateFlags], out: &mut [Output]) {
        let mut phase = self.phase;
        let mut start = self.start;
        let mut lp = self.lp;
        let mut value = self.value;
        let parameters = &self.parameters;

        for (&flags, out) in gate_flags.iter().zip(out.iter_mut()) {
            let segment = *self.table.get(self.active_segment);

            if let Some(time) = segment.time {
                phase += self.tables.rate_to_frequency(time.get(parameters));
            }
            let complete = phase >= 1.0;
            if complete {
                phase = 1.0;
            }

            let position = segment.phase.map_or(phase, |cell| cell.get(parameters));
            value = crossfade(
                start,
                segment.end.get(parameters),
                warp_phase(position, segment.curve.get(parameters)),
            );
            let coefficient = self
                .tables
                .portamento_to_coefficient(segment.portamento.get(parameters));
            one_pole(&mut lp, value, coefficient);

            let destination = if flags.is_rising() {
                segment.if_rising
            } else if flags.is_falling() {
                segment.if_falling
            } else if complete {
                segment.if_complete
            } else {
                None
            };

            if let Some(next) = destination {
                phase = 0.0;
                start = match self.table.get(next).start {
                    Some(cell) => cell.get(parameters),
                    None if next == self.active_segment => start,
                    None => value,
                };
                self.active_segment = next;
            }

            *out = Output {
                value: lp,
                phase,
                segment: self.active_segment,
            };
        }

        self.phase = phase;
        self.start = start;
        self.lp = lp;
        self.value = value;
    }
}
