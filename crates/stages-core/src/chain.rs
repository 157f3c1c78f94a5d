//! Six channels chained into groups by gate patching.
//!
//! Each channel has one stage declaration and two knobs. Patching a gate
//! input makes that channel the head of a group which also takes every
//! following unpatched channel, so a multi-stage envelope is built by
//! patching only its first channel:
//!
//! ```text
//! patched:  .  G  .  .  G  .
//! groups:  [0][1  2  3][4  5]
//! ```
//!
//! Unpatched channels before the first patched one run alone, free-running.
//!
//! The head's generator renders the whole group. Every other channel of the
//! group gets a follower generator that outputs `1 - phase` while its own
//! stage is the active one, and 0 otherwise.

use crate::gate::GateFlags;
use crate::generator::SegmentGenerator;
use crate::segment::{Output, StageConfig};
use crate::tables::Tables;

/// Number of channels in a chain.
pub const NUM_CHANNELS: usize = 6;

/// Samples per rendered block.
pub const BLOCK_SIZE: usize = 8;

/// Most looping stages a group may hold.
pub const MAX_LOOPS_PER_GROUP: usize = 2;

/// A run of channels rendered by one generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Group {
    /// First channel.
    pub first: usize,
    /// Number of channels.
    pub len: usize,
    /// Whether the first channel's gate input is patched.
    pub gated: bool,
}

impl Group {
    /// Channels of the group.
    pub fn channels(&self) -> core::ops::Range<usize> {
        self.first..self.first + self.len
    }
}

/// Partitions the channels into groups from gate patching.
#[derive(Clone, Debug, Default)]
pub struct GroupBuilder {
    groups: [Group; NUM_CHANNELS],
    count: usize,
}

impl GroupBuilder {
    /// Create a builder with no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Regroup. Returns true if the groups differ from the previous call.
    pub fn build(&mut self, patched: &[bool; NUM_CHANNELS]) -> bool {
        let mut next = [Group::default(); NUM_CHANNELS];
        let mut count = 0;
        let mut any_gate = false;

        for (channel, &gated) in patched.iter().enumerate() {
            if any_gate && !gated {
                next[count - 1].len += 1;
            } else {
                any_gate |= gated;
                next[count] = Group {
                    first: channel,
                    len: 1,
                    gated,
                };
                count += 1;
            }
        }

        let changed = count != self.count || next[..count] != self.groups[..count];
        self.groups = next;
        self.count = count;
        changed
    }

    /// Current groups, in channel order.
    pub fn groups(&self) -> &[Group] {
        &self.groups[..self.count]
    }

    /// Group containing `channel`.
    pub fn group_of(&self, channel: usize) -> Option<Group> {
        self.groups()
            .iter()
            .find(|g| g.channels().contains(&channel))
            .copied()
    }
}

/// Per-block inputs of a chain.
#[derive(Clone, Debug, Default)]
pub struct ChainInputs {
    /// Which gate inputs are patched.
    pub patched: [bool; NUM_CHANNELS],
    /// Gate flags per channel.
    pub gate_flags: [[GateFlags; BLOCK_SIZE]; NUM_CHANNELS],
    /// Primary knob per channel.
    pub primary: [f32; NUM_CHANNELS],
    /// Secondary knob per channel.
    pub secondary: [f32; NUM_CHANNELS],
}

/// One rendered block for every channel.
pub type ChainOutput = [[Output; BLOCK_SIZE]; NUM_CHANNELS];

/// Six segment generators and their stage declarations.
#[derive(Debug, Clone)]
pub struct Chain<'t> {
    generators: [SegmentGenerator<'t>; NUM_CHANNELS],
    stages: [StageConfig; NUM_CHANNELS],
    changed: [bool; NUM_CHANNELS],
    builder: GroupBuilder,
}

impl<'t> Chain<'t> {
    /// Create a chain of ramps reading from `tables`.
    pub fn new(tables: &'t Tables) -> Self {
        Self {
            generators: core::array::from_fn(|_| SegmentGenerator::new(tables)),
            stages: [StageConfig::default(); NUM_CHANNELS],
            changed: [true; NUM_CHANNELS],
            builder: GroupBuilder::new(),
        }
    }

    /// Stage declaration of `channel`.
    pub fn stage(&self, channel: usize) -> StageConfig {
        self.stages[channel]
    }

    /// Replace the stage declaration of `channel`.
    pub fn set_stage(&mut self, channel: usize, stage: StageConfig) {
        self.stages[channel] = stage;
        self.changed[channel] = true;
    }

    /// Cycle the kind of `channel`: ramp, step, hold.
    pub fn toggle_kind(&mut self, channel: usize) {
        self.stages[channel].kind = self.stages[channel].kind.next();
        self.changed[channel] = true;
    }

    /// Flip loop membership of `channel`.
    ///
    /// If that leaves its group with too many looping stages, only `channel`
    /// keeps looping.
    pub fn toggle_loop(&mut self, channel: usize) {
        self.changed[channel] = true;
        let looping = !self.stages[channel].looping;
        self.stages[channel].looping = looping;
        if !looping {
            return;
        }
        if let Some(group) = self.builder.group_of(channel) {
            let stages = &mut self.stages[group.channels()];
            if stages.iter().filter(|s| s.looping).count() > MAX_LOOPS_PER_GROUP {
                for (c, stage) in group.channels().zip(stages.iter_mut()) {
                    stage.looping = c == channel;
                }
            }
        }
    }

    /// Current groups.
    pub fn groups(&self) -> &[Group] {
        self.builder.groups()
    }

    /// Generator of `channel`.
    pub fn generator(&self, channel: usize) -> &SegmentGenerator<'t> {
        &self.generators[channel]
    }

    /// Render one block.
    pub fn process(&mut self, inputs: &ChainInputs, out: &mut ChainOutput) {
        let regrouped = self.builder.build(&inputs.patched);

        #[cfg(feature = "tracing")]
        if regrouped {
            tracing::debug!(groups = ?self.builder.groups(), "regrouped channels");
        }

        for &group in self.builder.groups() {
            let channels = group.channels();

            let mut apply = regrouped;
            for changed in &mut self.changed[channels.clone()] {
                apply |= core::mem::take(changed);
            }

            let stages = &mut self.stages[channels.clone()];
            if stages.iter().filter(|s| s.looping).count() > MAX_LOOPS_PER_GROUP {
                #[cfg(feature = "tracing")]
                tracing::debug!(first = group.first, "too many loops, clearing");

                apply = true;
                for stage in stages.iter_mut() {
                    stage.looping = false;
                }
            }

            if apply {
                self.generators[group.first].configure(group.gated, &self.stages[channels.clone()]);
                for k in 1..group.len {
                    self.generators[group.first + k].configure_follower(k);
                }
            }

            let head = &mut self.generators[group.first];
            for (j, c) in channels.enumerate() {
                head.set_segment_parameters(j, inputs.primary[c], inputs.secondary[c]);
            }
            head.process(&inputs.gate_flags[group.first], &mut out[group.first]);

            for k in 1..group.len {
                let c = group.first + k;
                out[c] = out[group.first];
                self.generators[c].process(&inputs.gate_flags[c], &mut out[c]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Personality, Program, StageKind};

    fn groups(patched: [bool; NUM_CHANNELS]) -> Vec<(usize, usize, bool)> {
        let mut builder = GroupBuilder::new();
        builder.build(&patched);
        builder
            .groups()
            .iter()
            .map(|g| (g.first, g.len, g.gated))
            .collect()
    }

    #[test]
    fn unpatched_channels_run_alone() {
        let g = groups([false; NUM_CHANNELS]);
        assert_eq!(g.len(), 6);
        assert!(g.iter().all(|&(_, len, gated)| len == 1 && !gated));
    }

    #[test]
    fn patched_channel_takes_following_channels() {
        let g = groups([false, true, false, false, true, false]);
        assert_eq!(g, [(0, 1, false), (1, 3, true), (4, 2, true)]);
    }

    #[test]
    fn all_patched_is_six_gated_groups() {
        let g = groups([true; NUM_CHANNELS]);
        assert_eq!(g.len(), 6);
        assert!(g.iter().all(|&(_, len, gated)| len == 1 && gated));
    }

    #[test]
    fn build_reports_changes() {
        let mut builder = GroupBuilder::new();
        assert!(builder.build(&[false; NUM_CHANNELS]));
        assert!(!builder.build(&[false; NUM_CHANNELS]));
        let patched = [true, false, false, false, false, false];
        assert!(builder.build(&patched));
        assert!(!builder.build(&patched));
        assert_eq!(builder.group_of(4), Some(Group { first: 0, len: 6, gated: true }));
    }

    #[test]
    fn toggle_kind_cycles() {
        let tables = Tables::new(48000.0);
        let mut chain = Chain::new(&tables);
        chain.toggle_kind(2);
        assert_eq!(chain.stage(2).kind, StageKind::Step);
        chain.toggle_kind(2);
        chain.toggle_kind(2);
        assert_eq!(chain.stage(2).kind, StageKind::Ramp);
    }

    #[test]
    fn toggle_loop_keeps_at_most_two() {
        let tables = Tables::new(48000.0);
        let mut chain = Chain::new(&tables);
        let mut inputs = ChainInputs::default();
        inputs.patched[0] = true;
        let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];
        chain.process(&inputs, &mut out);

        chain.toggle_loop(1);
        chain.toggle_loop(2);
        assert!(chain.stage(1).looping && chain.stage(2).looping);
        chain.toggle_loop(3);
        let looping: Vec<bool> = (0..NUM_CHANNELS).map(|c| chain.stage(c).looping).collect();
        assert_eq!(looping, [false, false, false, true, false, false]);

        chain.toggle_loop(3);
        assert!(!chain.stage(3).looping);
    }

    #[test]
    fn excess_loops_are_cleared_on_render() {
        let tables = Tables::new(48000.0);
        let mut chain = Chain::new(&tables);
        for c in 0..3 {
            chain.set_stage(c, StageConfig::looping(StageKind::Ramp));
        }
        let mut inputs = ChainInputs::default();
        inputs.patched[0] = true;
        let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];
        chain.process(&inputs, &mut out);
        assert!((0..NUM_CHANNELS).all(|c| !chain.stage(c).looping));
    }

    #[test]
    fn extension_channels_follow_their_stage() {
        let tables = Tables::new(48000.0);
        let mut chain = Chain::new(&tables);
        let mut inputs = ChainInputs::default();
        inputs.patched[0] = true;
        inputs.primary = [0.0; NUM_CHANNELS];
        inputs.secondary = [0.5; NUM_CHANNELS];
        inputs.gate_flags[0][0] = GateFlags::HIGH | GateFlags::RISING;
        let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];

        chain.process(&inputs, &mut out);
        assert_eq!(chain.groups().len(), 1);
        assert_eq!(chain.generator(0).num_segments(), NUM_CHANNELS);
        assert_eq!(
            chain.generator(3).program(),
            Program::Single(Personality::Follower { monitored_segment: 3 })
        );

        // Stage 0 is active: channel 0 carries the envelope, the others are
        // silent.
        for j in 1..BLOCK_SIZE {
            assert_eq!(out[0][j].segment, 0);
            assert!(out[0][j].value > 0.0);
            for c in 1..NUM_CHANNELS {
                assert_eq!(out[c][j].value, 0.0);
            }
        }

        // Run until stage 1 is active and check its follower.
        inputs.gate_flags[0][0] = GateFlags::HIGH;
        let mut seen = false;
        for _ in 0..16 {
            chain.process(&inputs, &mut out);
            for j in 0..BLOCK_SIZE {
                if out[0][j].segment == 1 {
                    seen = true;
                    assert!((out[1][j].value - (1.0 - out[0][j].phase)).abs() < 1e-6);
                }
            }
        }
        assert!(seen);
    }
}
