//! Integration tests for stages-core.
//!
//! Drives generators and chains with gate streams and checks signal-level
//! behavior: loop cycling and step jumps, envelope shapes, sample and hold
//! timing, click-free stage switches and group rendering.

use stages_core::{
    BLOCK_SIZE, Chain, ChainInputs, GateFlags, NUM_CHANNELS, Output, Personality, Program,
    SegmentGenerator, StageConfig, StageKind, Tables,
};

const SAMPLE_RATE: f32 = 48000.0;

/// Turn a level stream into gate flags.
fn gate(levels: impl IntoIterator<Item = bool>) -> Vec<GateFlags> {
    let mut previous = GateFlags::LOW;
    levels
        .into_iter()
        .map(|high| {
            previous = previous.extract(high);
            previous
        })
        .collect()
}

/// Render a whole stream in blocks.
fn render(generator: &mut SegmentGenerator<'_>, flags: &[GateFlags]) -> Vec<Output> {
    let mut out = vec![Output::default(); flags.len()];
    for (f, o) in flags.chunks(BLOCK_SIZE).zip(out.chunks_mut(BLOCK_SIZE)) {
        generator.process(f, o);
    }
    out
}

// ============================================================================
// 1. Topology behavior
// ============================================================================

#[test]
fn looping_ramps_cycle_until_rise_jumps_to_step() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut generator = SegmentGenerator::new(&tables);
    generator.configure(
        true,
        &[
            StageConfig::looping(StageKind::Ramp),
            StageConfig::looping(StageKind::Ramp),
            StageConfig::new(StageKind::Step),
        ],
    );
    generator.set_segment_parameters(0, 0.1, 0.5);
    generator.set_segment_parameters(1, 0.1, 0.5);
    generator.set_segment_parameters(2, 0.3, 0.0);

    // Held gate, no edges after the first rise.
    let held = 2000;
    let levels = (0..held + 100).map(|i| i < held || i >= held + 50);
    let flags = gate(levels);
    let out = render(&mut generator, &flags);

    assert!(out[..held].iter().all(|o| o.segment < 2));
    let returns = out[..held]
        .windows(2)
        .filter(|w| w[0].segment == 1 && w[1].segment == 0)
        .count();
    assert!(returns >= 5, "only {returns} loop cycles");

    // The fall does not leave the loop; the next rise goes straight to the step.
    assert!(out[held..held + 50].iter().all(|o| o.segment < 2));
    assert!(flags[held + 50].is_rising());
    assert_eq!(out[held + 50].segment, 2);
    assert!(out[held + 51..].iter().all(|o| o.segment == 2));
    assert!((out[out.len() - 1].value - 0.3).abs() < 1e-4);
}

#[test]
fn every_single_stage_selects_its_personality() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut generator = SegmentGenerator::new(&tables);
    let cases = [
        (StageKind::Ramp, false, false, Personality::Zero),
        (StageKind::Ramp, false, true, Personality::FreeRunningLfo),
        (StageKind::Ramp, true, false, Personality::DecayEnvelope),
        (StageKind::Ramp, true, true, Personality::TapLfo),
        (StageKind::Step, false, false, Personality::Portamento),
        (StageKind::Step, false, true, Personality::Portamento),
        (StageKind::Step, true, false, Personality::SampleAndHold),
        (StageKind::Step, true, true, Personality::SampleAndHold),
        (StageKind::Hold, false, false, Personality::Delay),
        (StageKind::Hold, false, true, Personality::Delay),
        (StageKind::Hold, true, false, Personality::TimedPulse),
        (StageKind::Hold, true, true, Personality::Gate),
    ];
    for (kind, has_trigger, looping, personality) in cases {
        generator.configure(has_trigger, &[StageConfig { kind, looping }]);
        assert_eq!(generator.program(), Program::Single(personality));
    }
}

// ============================================================================
// 2. Envelope shapes
// ============================================================================

#[test]
fn decay_envelope_falls_then_holds() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut generator = SegmentGenerator::new(&tables);
    generator.configure(true, &[StageConfig::new(StageKind::Ramp)]);
    generator.set_segment_parameters(0, 0.3, 0.5);

    let out = render(&mut generator, &gate((0..2000).map(|i| i < 4)));

    let end = out.iter().position(|o| o.phase >= 1.0).expect("decay completes");
    assert!(end > 100);
    for w in out[..=end].windows(2) {
        assert!(w[1].phase > w[0].phase);
        assert!(w[1].value < w[0].value);
    }
    assert!(out[end..].iter().all(|o| o.phase == 1.0 && o.value == 0.0));
}

#[test]
fn stage_switches_do_not_click() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut generator = SegmentGenerator::new(&tables);
    generator.configure(true, &[StageConfig::new(StageKind::Ramp); 3]);
    for i in 0..3 {
        generator.set_segment_parameters(i, 0.35, 0.5);
    }

    // Retrigger halfway through the envelope.
    let out = render(&mut generator, &gate((0..6000).map(|i| i < 4 || (1500..1504).contains(&i))));

    let max_step = tables.rate_to_frequency(0.35) * 1.01;
    let transitions = out.windows(2).filter(|w| w[0].segment != w[1].segment).count();
    assert!(transitions >= 4);
    for (i, w) in out.windows(2).enumerate() {
        let step = (w[1].value - w[0].value).abs();
        assert!(step <= max_step, "jump of {step} at sample {i}");
    }
}

#[test]
fn sample_and_hold_changes_only_on_rise() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut generator = SegmentGenerator::new(&tables);
    generator.configure(true, &[StageConfig::new(StageKind::Step)]);

    let flags = gate((0..4000).map(|i| i % 40 < 20));
    let mut out = vec![Output::default(); flags.len()];
    for (b, (f, o)) in flags
        .chunks(BLOCK_SIZE)
        .zip(out.chunks_mut(BLOCK_SIZE))
        .enumerate()
    {
        // Rising primary input, no lag.
        generator.set_segment_parameters(0, b as f32 / 500.0, 0.0);
        generator.process(f, o);
    }

    let mut changes = 0;
    for i in 1..out.len() {
        if out[i].value != out[i - 1].value {
            changes += 1;
            assert!(flags[i].is_rising(), "output moved at sample {i} without a rise");
        }
    }
    assert!(changes > 50);
}

// ============================================================================
// 3. Chain rendering
// ============================================================================

#[test]
fn chain_renders_adsr_and_independent_channels() {
    let tables = Tables::new(SAMPLE_RATE);
    let mut chain = Chain::new(&tables);
    chain.set_stage(0, StageConfig::new(StageKind::Ramp));
    chain.set_stage(1, StageConfig::new(StageKind::Ramp));
    chain.set_stage(2, StageConfig::looping(StageKind::Hold));
    chain.set_stage(3, StageConfig::new(StageKind::Ramp));
    chain.set_stage(4, StageConfig::new(StageKind::Hold));
    chain.set_stage(5, StageConfig::new(StageKind::Step));

    let mut inputs = ChainInputs {
        patched: [true, false, false, false, true, true],
        primary: [0.1, 0.2, 0.6, 0.2, 0.8, 0.4],
        secondary: [0.5; NUM_CHANNELS],
        ..ChainInputs::default()
    };

    let mut previous = [GateFlags::LOW; NUM_CHANNELS];
    let mut envelope = Vec::new();
    let mut sustain_follower = Vec::new();
    let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];

    for block in 0..300 {
        let high = block < 100;
        for c in 0..NUM_CHANNELS {
            for j in 0..BLOCK_SIZE {
                previous[c] = previous[c].extract(high);
                inputs.gate_flags[c][j] = previous[c];
            }
        }
        chain.process(&inputs, &mut out);
        envelope.extend(out[0].iter().copied());
        sustain_follower.extend(out[2].iter().map(|o| o.value));
    }

    assert_eq!(chain.groups().len(), 3);
    assert_eq!(chain.generator(4).program(), Program::Single(Personality::TimedPulse));
    assert_eq!(chain.generator(5).program(), Program::Single(Personality::SampleAndHold));

    let peak = envelope.iter().map(|o| o.value).fold(0.0, f32::max);
    assert!((peak - 1.0).abs() < 1e-3, "peak {peak}");

    // Sustaining just before the fall.
    let before_fall = envelope[100 * BLOCK_SIZE - 1];
    assert_eq!(before_fall.segment, 2);
    assert!((before_fall.value - 0.6).abs() < 1e-3);
    assert_eq!(sustain_follower[100 * BLOCK_SIZE - 1], 1.0);

    // Released after the fall.
    let last = envelope[envelope.len() - 1];
    assert!(last.value < 1e-3, "release ended at {}", last.value);
    assert_eq!(sustain_follower[sustain_follower.len() - 1], 0.0);
}
