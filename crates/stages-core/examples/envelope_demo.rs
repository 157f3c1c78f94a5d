//! Envelope demo: an ADSR and a looping AD rendered as ASCII plots.
//!
//! Run with: cargo run -p stages-core --example envelope_demo

use stages_core::{
    BLOCK_SIZE, GateFlags, Output, Personality, SegmentGenerator, StageConfig, StageKind, Tables,
    extract_gate_flags,
};

const SAMPLE_RATE: f32 = 48000.0;
const WIDTH: usize = 64;

fn render(generator: &mut SegmentGenerator<'_>, gate_samples: usize, total: usize) -> Vec<Output> {
    let levels: Vec<bool> = (0..total).map(|i| i < gate_samples).collect();
    let mut flags = vec![GateFlags::LOW; total];
    extract_gate_flags(&mut GateFlags::LOW, &levels, &mut flags);

    let mut out = vec![Output::default(); total];
    for (f, o) in flags.chunks(BLOCK_SIZE).zip(out.chunks_mut(BLOCK_SIZE)) {
        generator.process(f, o);
    }
    out
}

fn plot(title: &str, out: &[Output]) {
    println!("=== {title} ===\n");
    let rows = out.len() / 24;
    for chunk in out.chunks(rows.max(1)) {
        let o = chunk[0];
        let bar = (o.value.clamp(0.0, 1.0) * WIDTH as f32) as usize;
        println!("seg {:>2} {:>6.3} |{}", o.segment, o.value, "#".repeat(bar));
    }
    println!();
}

fn main() {
    let tables = Tables::new(SAMPLE_RATE);

    let mut adsr = SegmentGenerator::new(&tables);
    adsr.configure(
        true,
        &[
            StageConfig::new(StageKind::Ramp),
            StageConfig::new(StageKind::Ramp),
            StageConfig::looping(StageKind::Hold),
            StageConfig::new(StageKind::Ramp),
        ],
    );
    adsr.set_segment_parameters(0, 0.2, 0.3);
    adsr.set_segment_parameters(1, 0.3, 0.6);
    adsr.set_segment_parameters(2, 0.6, 0.5);
    adsr.set_segment_parameters(3, 0.3, 0.6);
    plot("ADSR", &render(&mut adsr, 12_000, 24_000));

    let mut looping = SegmentGenerator::new(&tables);
    looping.configure(
        true,
        &[
            StageConfig::looping(StageKind::Ramp),
            StageConfig::looping(StageKind::Ramp),
        ],
    );
    looping.set_segment_parameters(0, 0.3, 0.2);
    looping.set_segment_parameters(1, 0.35, 0.8);
    plot("Looping AD", &render(&mut looping, 20_000, 24_000));

    let mut lfo = SegmentGenerator::new(&tables);
    lfo.configure_personality(Personality::FreeRunningLfo);
    lfo.set_segment_parameters(0, 0.4, 0.5);
    plot("Free-running LFO", &render(&mut lfo, 0, 24_000));
}
