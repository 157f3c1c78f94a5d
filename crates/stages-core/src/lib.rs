//! Stages Core - multi-mode segment generator
//!
//! This crate implements the per-channel engine of a modular segment
//! generator: a channel is declared as a short list of stages, compiled into
//! a transition graph, and walked sample by sample under control of a gate.
//! The same engine also runs a dozen single-stage personalities (envelopes,
//! LFOs, sample and hold, delay, portamento) selected from the stage kind,
//! loop flag and gate patching.
//!
//! # Core Abstractions
//!
//! ## Declarations
//!
//! - [`StageKind`] - ramp, step or hold
//! - [`StageConfig`] - one stage: kind plus loop membership
//! - [`Parameters`] - the two knobs of a stage
//!
//! ## Compilation and Rendering
//!
//! - [`SegmentTable`] - compiled transition graph with a parked sentinel
//! - [`Personality`] - closed set of single-stage renderers
//! - [`SegmentGenerator`] - runtime state, `configure` and block `process`
//! - [`Chain`] - six generators grouped by gate patching
//!
//! ## Building Blocks
//!
//! - [`Tables`] - rate and lag lookup tables, shared by reference
//! - [`GateFlags`] - per-sample gate level and edges
//! - [`warp_phase`](shape::warp_phase), [`LfoShape`] - curve warp and LFO shaper
//! - [`BlockInterpolator`] - per-block knob ramps
//! - [`RatioQuantizer`], [`RampExtractor`] - tap-tempo clock tracking
//! - [`FixedDelayLine`] - stack-allocated delay line
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! stages-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use stages_core::{GateFlags, Output, SegmentGenerator, StageConfig, StageKind, Tables};
//!
//! let tables = Tables::new(48000.0);
//! let mut generator = SegmentGenerator::new(&tables);
//!
//! // A lone looping ramp with no gate is a free-running LFO.
//! generator.configure(false, &[StageConfig::looping(StageKind::Ramp)]);
//! generator.set_segment_parameters(0, 0.75, 0.5);
//!
//! let flags = [GateFlags::LOW; 8];
//! let mut out = [Output::default(); 8];
//! generator.process(&flags, &mut out);
//! assert!(out.iter().all(|o| (0.0..=1.0).contains(&o.value)));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, no I/O and no error path while rendering
//! - **No dependencies on std**: pure `no_std` with `libm` for math
//! - **Knobs by reference**: segments bind knob cells, so turning a knob never
//!   recompiles the graph

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chain;
pub mod compiler;
pub mod delay;
pub mod gate;
pub mod generator;
pub mod math;
pub mod param;
pub mod ramp;
pub mod ratio;
pub mod segment;
pub mod shape;
pub mod tables;

// Re-export main types at crate root
pub use chain::{
    BLOCK_SIZE, Chain, ChainInputs, ChainOutput, Group, GroupBuilder, MAX_LOOPS_PER_GROUP,
    NUM_CHANNELS,
};
pub use compiler::SegmentTable;
pub use delay::FixedDelayLine;
pub use gate::{GateFlags, extract_gate_flags};
pub use generator::SegmentGenerator;
pub use math::{crossfade, flush_denormal, one_pole, semitones_to_ratio, slope};
pub use param::BlockInterpolator;
pub use ramp::RampExtractor;
pub use ratio::{DIVIDER_RATIOS, Ratio, RatioQuantizer};
pub use segment::{
    Cell, DELAY_CAPACITY, MAX_SEGMENTS, Output, Parameters, Personality, Program, Segment,
    StageConfig, StageKind,
};
pub use shape::{LfoShape, warp_phase};
pub use tables::Tables;
