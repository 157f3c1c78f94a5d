//! Data model shared by the compiler and the generator.
//!
//! A channel is declared as a list of [`StageConfig`]s. The compiler turns
//! that into a table of [`Segment`]s whose fields are [`Cell`] references:
//! either a shared constant or one of the per-stage knobs stored in
//! [`Parameters`]. Binding by reference rather than by value lets the same
//! table follow the knobs without being rebuilt.

/// Maximum number of stages in one generator.
pub const MAX_SEGMENTS: usize = 36;

/// Capacity of the delay personality's line, in samples.
pub const DELAY_CAPACITY: usize = 768;

/// The three declarative stage kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StageKind {
    /// Timed move from the current value toward a target.
    #[default]
    Ramp,
    /// Jump to a level, optionally gliding.
    Step,
    /// Sit at a level for a time.
    Hold,
}

impl StageKind {
    /// Next kind in the front-panel cycle ramp → step → hold → ramp.
    pub const fn next(self) -> Self {
        match self {
            Self::Ramp => Self::Step,
            Self::Step => Self::Hold,
            Self::Hold => Self::Ramp,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Ramp => 0,
            Self::Step => 1,
            Self::Hold => 2,
        }
    }
}

/// Declaration of one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageConfig {
    /// Stage kind.
    pub kind: StageKind,
    /// Whether the stage belongs to the loop region.
    #[cfg_attr(feature = "serde", serde(rename = "loop", default))]
    pub looping: bool,
}

impl StageConfig {
    /// A non-looping stage.
    pub const fn new(kind: StageKind) -> Self {
        Self {
            kind,
            looping: false,
        }
    }

    /// A looping stage.
    pub const fn looping(kind: StageKind) -> Self {
        Self {
            kind,
            looping: true,
        }
    }
}

/// The two knobs of a stage, normalized to [0, 1].
///
/// Ramps read them as (rate, curve); steps as (level, glide); holds as
/// (level, duration).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Parameters {
    /// Primary knob.
    pub primary: f32,
    /// Secondary knob.
    pub secondary: f32,
}

/// Where a segment field reads its value from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    /// A fixed value.
    Constant(f32),
    /// Primary knob of stage `n`.
    Primary(usize),
    /// Secondary knob of stage `n`.
    Secondary(usize),
}

impl Cell {
    /// Shared constant 0.
    pub const ZERO: Self = Self::Constant(0.0);
    /// Shared constant 1.
    pub const ONE: Self = Self::Constant(1.0);
    /// Neutral curve / midpoint.
    pub const HALF: Self = Self::Constant(0.5);

    /// Read the cell.
    #[inline]
    pub fn get(self, parameters: &[Parameters]) -> f32 {
        match self {
            Self::Constant(value) => value,
            Self::Primary(i) => parameters[i].primary,
            Self::Secondary(i) => parameters[i].secondary,
        }
    }
}

/// One node of the runtime transition graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Entry value. `None` continues from wherever the generator is.
    pub start: Option<Cell>,
    /// Target value.
    pub end: Cell,
    /// Rate knob. `None` freezes the phase.
    pub time: Option<Cell>,
    /// Curve knob fed to the phase warp.
    pub curve: Cell,
    /// Lag knob of the output low-pass.
    pub portamento: Cell,
    /// Fixed interpolation position overriding the running phase.
    pub phase: Option<Cell>,
    /// Destination on a gate rise.
    pub if_rising: Option<usize>,
    /// Destination on a gate fall.
    pub if_falling: Option<usize>,
    /// Destination when the phase reaches 1.
    pub if_complete: Option<usize>,
}

impl Segment {
    /// Parked segment: sits at zero and goes nowhere on its own.
    pub const IDLE: Self = Self {
        start: Some(Cell::ZERO),
        end: Cell::ZERO,
        time: Some(Cell::ZERO),
        curve: Cell::HALF,
        portamento: Cell::ZERO,
        phase: None,
        if_rising: Some(0),
        if_falling: Some(0),
        if_complete: Some(0),
    };
}

impl Default for Segment {
    fn default() -> Self {
        Self::IDLE
    }
}

/// One sample of generator output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Output {
    /// Output level, nominally [0, 1].
    pub value: f32,
    /// Position within the active segment, [0, 1].
    pub phase: f32,
    /// Index of the active segment.
    pub segment: usize,
}

/// Single-stage render behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Personality {
    /// Constant zero.
    Zero,
    /// One-shot decay, restarted by each gate rise.
    DecayEnvelope,
    /// Fixed-length pulse after each gate rise.
    TimedPulse,
    /// Primary level while the gate is high.
    Gate,
    /// Primary level latched on each gate rise, then lagged.
    SampleAndHold,
    /// Primary level resampled by an internal clock.
    ClockedSampleAndHold,
    /// LFO locked to the gate as a clock.
    TapLfo,
    /// LFO at a knob-set frequency.
    FreeRunningLfo,
    /// Delay line clocked by the secondary knob.
    Delay,
    /// Lagged primary level.
    Portamento,
    /// Gate-like output derived from another generator's block.
    Follower {
        /// Segment whose activity this follower reports.
        monitored_segment: usize,
    },
}

impl Personality {
    const TABLE: [Self; 12] = [
        // Ramp
        Self::Zero,
        Self::FreeRunningLfo,
        Self::DecayEnvelope,
        Self::TapLfo,
        // Step
        Self::Portamento,
        Self::Portamento,
        Self::SampleAndHold,
        Self::SampleAndHold,
        // Hold
        Self::Delay,
        Self::Delay,
        Self::TimedPulse,
        Self::Gate,
    ];

    /// Personality for a lone stage.
    ///
    /// `has_trigger` tells whether the channel's gate input is patched.
    pub const fn select(stage: StageConfig, has_trigger: bool) -> Self {
        let index = stage.kind.index() * 4 + (has_trigger as usize) * 2 + stage.looping as usize;
        Self::TABLE[index]
    }
}

/// What a generator renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Program {
    /// Walk the segment table.
    MultiSegment,
    /// Run one personality.
    Single(Personality),
}
