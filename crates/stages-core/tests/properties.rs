//! Property-based tests for stages-core.
//!
//! Tests compiler determinism, completion-path termination and output
//! bounds using proptest for randomized stage lists, knobs and gates.

use proptest::prelude::*;
use stages_core::{
    GateFlags, MAX_SEGMENTS, Output, SegmentGenerator, SegmentTable, StageConfig, StageKind,
    Tables,
};

fn stage_strategy() -> impl Strategy<Value = StageConfig> {
    (0u8..3, any::<bool>()).prop_map(|(kind, looping)| StageConfig {
        kind: match kind {
            0 => StageKind::Ramp,
            1 => StageKind::Step,
            _ => StageKind::Hold,
        },
        looping,
    })
}

fn stages_strategy(max: usize) -> impl Strategy<Value = Vec<StageConfig>> {
    prop::collection::vec(stage_strategy(), 2..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Compiling the same declaration twice yields identical tables.
    #[test]
    fn compile_is_idempotent(stages in stages_strategy(MAX_SEGMENTS)) {
        let a = SegmentTable::compile(&stages);
        let b = SegmentTable::compile(&stages);
        prop_assert_eq!(a, b);
    }

    /// Every real segment has a completion target, every target is inside
    /// the table, and following completions from any segment either cycles
    /// or parks on the sentinel.
    #[test]
    fn completion_paths_cycle_or_park(stages in stages_strategy(12)) {
        let table = SegmentTable::compile(&stages);
        let n = table.num_segments();
        prop_assert_eq!(table.segments().len(), n + 1);

        for (i, segment) in table.segments().iter().enumerate() {
            for target in [segment.if_rising, segment.if_falling, segment.if_complete]
                .into_iter()
                .flatten()
            {
                prop_assert!(target <= n, "segment {} targets {}", i, target);
            }
            if i < n {
                prop_assert!(segment.if_complete.is_some(), "segment {} never completes", i);
            }
        }

        for from in 0..=n {
            let mut visited = vec![false; n + 1];
            let mut current = from;
            loop {
                if visited[current] {
                    break;
                }
                visited[current] = true;
                match table.get(current).if_complete {
                    Some(next) => current = next,
                    None => {
                        prop_assert_eq!(current, n, "dead end at {}", current);
                        break;
                    }
                }
            }
        }
    }

    /// For any declaration, knobs in [0, 1] and gate pattern, the output is
    /// finite, in range, and reports a segment inside the table.
    #[test]
    fn output_stays_bounded(
        stages in prop::collection::vec(stage_strategy(), 1..=6),
        has_trigger in any::<bool>(),
        knobs in prop::collection::vec((0.0f32..=1.0f32, 0.0f32..=1.0f32), 6),
        levels in prop::collection::vec(any::<bool>(), 64),
    ) {
        let tables = Tables::new(48000.0);
        let mut generator = SegmentGenerator::new(&tables);
        generator.configure(has_trigger, &stages);
        for (i, &(primary, secondary)) in knobs.iter().enumerate() {
            generator.set_segment_parameters(i, primary, secondary);
        }

        let mut previous = GateFlags::LOW;
        let flags: Vec<GateFlags> = levels
            .iter()
            .map(|&high| {
                previous = previous.extract(high);
                previous
            })
            .collect();

        let mut out = [Output::default(); 8];
        for _ in 0..20 {
            for block in flags.chunks(8) {
                generator.process(block, &mut out[..block.len()]);
                for o in &out[..block.len()] {
                    prop_assert!(o.value.is_finite());
                    prop_assert!((-1e-3..=1.0 + 1e-3).contains(&o.value), "value {}", o.value);
                    prop_assert!((0.0..=1.0).contains(&o.phase), "phase {}", o.phase);
                    prop_assert!(o.segment <= stages.len().max(1));
                }
            }
        }
    }
}
