//! Patch demo: factory presets, validation, and rendering a patch.
//!
//! Run with: RUST_LOG=debug cargo run -p stages-config --example patch_demo

use stages_config::{ChannelConfig, Patch, factory_presets};
use stages_core::{
    BLOCK_SIZE, Chain, GateFlags, NUM_CHANNELS, Output, StageKind, extract_gate_flags,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Factory Presets ===\n");
    for patch in factory_presets() {
        println!(
            "{:<16} {} channels  {}",
            patch.name,
            patch.len(),
            patch.description.as_deref().unwrap_or("")
        );
    }

    println!("\n=== Validation ===\n");
    let broken = Patch::new("Broken").with_channels([
        ChannelConfig::new(StageKind::Ramp).gated().looping(),
        ChannelConfig::new(StageKind::Hold).looping(),
        ChannelConfig::new(StageKind::Ramp).looping().with_knobs(1.2, 0.5),
    ]);
    match broken.validate() {
        Ok(()) => println!("{} is valid", broken.name),
        Err(e) => println!("{}: {e}", broken.name),
    }

    println!("\n=== Rendering ADSR ===\n");
    let Some(patch) = stages_config::get_factory_preset("adsr") else {
        return;
    };
    println!("{}", patch.to_toml().unwrap_or_default());

    let tables = patch.tables();
    let mut chain = Chain::new(&tables);
    patch.apply(&mut chain);

    let mut inputs = patch.chain_inputs();
    let mut previous = GateFlags::LOW;
    let mut out = [[Output::default(); BLOCK_SIZE]; NUM_CHANNELS];
    for block in 0..3000 {
        extract_gate_flags(&mut previous, &[block < 1500; BLOCK_SIZE], &mut inputs.gate_flags[0]);
        chain.process(&inputs, &mut out);
        if block % 150 == 0 {
            let o = out[0][0];
            println!("block {block:>4}  segment {}  {:.3}", o.segment, o.value);
        }
    }
}
