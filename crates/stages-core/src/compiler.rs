//! Topology compiler: stage declarations to a wired segment table.
//!
//! A table for `n` stages holds `n + 1` segments. The extra one is a parked
//! sentinel where the generator waits after reconfiguration until the first
//! gate edge (or, for a loop ending on the last stage, completion) sends it
//! into the real graph.
//!
//! Routing rules, for stage `i`:
//!
//! - completion moves to `i + 1`, or back to the loop start from the loop's
//!   last stage
//! - a gate fall leaves the loop for the stage after it, but only when the
//!   loop does not end on the last stage and no stage is a step
//! - a gate rise restarts at stage 0, unless the channel has steps: then it
//!   moves to the stage after the next step, so a chain of steps advances
//!   one stage per trigger like a sequencer

use crate::segment::{Cell, MAX_SEGMENTS, Segment, StageConfig, StageKind};

/// Compiled segment graph for a multi-stage channel.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentTable {
    segments: [Segment; MAX_SEGMENTS + 1],
    num_segments: usize,
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self {
            segments: [Segment::IDLE; MAX_SEGMENTS + 1],
            num_segments: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct LoopRegion {
    start: usize,
    end: usize,
}

impl LoopRegion {
    fn contains(self, i: usize) -> bool {
        (self.start..=self.end).contains(&i)
    }
}

impl SegmentTable {
    /// Compile a list of stages.
    ///
    /// Looping stages mark a region from the first to the last of them.
    ///
    /// # Panics
    ///
    /// Panics if `stages` is empty or longer than [`MAX_SEGMENTS`].
    pub fn compile(stages: &[StageConfig]) -> Self {
        let n = stages.len();
        assert!(
            (1..=MAX_SEGMENTS).contains(&n),
            "stage count {n} out of range 1..={MAX_SEGMENTS}"
        );
        let last = n - 1;

        let mut looping = stages.iter().enumerate().filter(|(_, s)| s.looping);
        let region = looping.next().map(|(start, _)| LoopRegion {
            start,
            end: looping.last().map_or(start, |(end, _)| end),
        });
        let has_step = stages.iter().any(|s| s.kind == StageKind::Step);
        let first_ramp = stages.iter().position(|s| s.kind == StageKind::Ramp);
        let step_inside_loop = region.is_some_and(|r| {
            stages[r.start..=r.end]
                .iter()
                .any(|s| s.kind == StageKind::Step)
        });

        let mut table = Self::default();
        table.num_segments = n;

        for (i, stage) in stages.iter().enumerate() {
            let single_loop = region.is_some_and(|r| r.start == i && r.end == i);
            let s = &mut table.segments[i];

            match stage.kind {
                StageKind::Ramp => {
                    s.start = (n == 1).then_some(Cell::ONE);
                    s.time = Some(Cell::Primary(i));
                    s.curve = Cell::Secondary(i);
                    s.portamento = Cell::ZERO;
                    s.phase = None;
                    s.end = if i == last {
                        Cell::ZERO
                    } else if stages[i + 1].kind != StageKind::Ramp {
                        Cell::Primary(i + 1)
                    } else if first_ramp == Some(i) {
                        Cell::ONE
                    } else {
                        // Middle of a run of ramps: the curve knob is the
                        // target level and the shape is linear.
                        s.curve = Cell::HALF;
                        Cell::Secondary(i)
                    };
                }
                StageKind::Step => {
                    s.start = Some(Cell::Primary(i));
                    s.end = Cell::Primary(i);
                    s.curve = Cell::HALF;
                    s.portamento = Cell::Secondary(i);
                    s.time = None;
                    // A one-stage loop samples once; otherwise track the knob.
                    s.phase = Some(if single_loop { Cell::ZERO } else { Cell::ONE });
                }
                StageKind::Hold => {
                    s.start = Some(Cell::Primary(i));
                    s.end = Cell::Primary(i);
                    s.curve = Cell::HALF;
                    s.portamento = Cell::ZERO;
                    // A one-stage loop holds forever.
                    s.time = (!single_loop).then_some(Cell::Secondary(i));
                    s.phase = Some(Cell::ONE);
                }
            }

            s.if_complete = Some(match region {
                Some(r) if r.end == i => r.start,
                _ => i + 1,
            });
            s.if_falling = match region {
                Some(r) if r.end != last && !has_step => Some(r.end + 1),
                _ => None,
            };
            s.if_rising = Some(if !has_step {
                0
            } else if !step_inside_loop && region.is_some_and(|r| r.contains(i)) {
                region.map_or(0, |r| (r.end + 1) % n)
            } else {
                rising_target(stages, i, region)
            });
        }

        let end = table.segments[last].end;
        table.segments[n] = Segment {
            start: Some(end),
            end,
            time: Some(Cell::ZERO),
            curve: Cell::HALF,
            portamento: Cell::ZERO,
            phase: None,
            if_rising: Some(0),
            if_falling: None,
            if_complete: region.and_then(|r| (r.end == last).then_some(0)),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            num_segments = n,
            loop_start = region.map(|r| r.start),
            loop_end = region.map(|r| r.end),
            has_step,
            "compiled segment table"
        );

        table
    }

    /// Number of real stages.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// Index of the sentinel segment.
    #[inline]
    pub fn sentinel(&self) -> usize {
        self.num_segments
    }

    /// The real segments followed by the sentinel.
    pub fn segments(&self) -> &[Segment] {
        &self.segments[..=self.num_segments]
    }

    /// Segment `index`.
    #[inline]
    pub fn get(&self, index: usize) -> &Segment {
        &self.segments[index]
    }
}

/// Stage reached by a gate rise from stage `i` when the channel has steps:
/// the one after the next step, following the loop once.
fn rising_target(stages: &[StageConfig], i: usize, region: Option<LoopRegion>) -> usize {
    let n = stages.len();
    let mut follow_loop = region;
    let mut next_step = i;
    while stages[next_step].kind != StageKind::Step {
        next_step += 1;
        if let Some(r) = follow_loop
            && next_step == r.end + 1
        {
            next_step = r.start;
            follow_loop = None;
        }
        if next_step >= n {
            next_step = n - 1;
            break;
        }
    }
    match region {
        Some(r) if r.end == next_step => r.start,
        _ => (next_step + 1) % n,
    }
}
