//! # Gantry Headless Runner
//!
//! Drives the diorama without a window at an uneven frame cadence and prints
//! what the crane did.
//!
//! ```bash
//! # Default diorama, one simulated minute
//! ./gantry_headless
//!
//! # Custom config, ten minutes
//! ./gantry_headless diorama.toml 600
//! ```

use std::env;
use std::process;

use gantry::core::{BlockId, HostHook};
use gantry::{Diorama, DioramaConfig};

/// Frame deltas cycled by the runner: vsync, dropped frames, a hitch.
const CADENCE: [f32; 8] = [
    1.0 / 60.0,
    1.0 / 60.0,
    1.0 / 30.0,
    1.0 / 144.0,
    1.0 / 60.0,
    1.0 / 20.0,
    1.0 / 120.0,
    1.0 / 60.0,
];

/// Stand-in for the browser's animation frame registration.
struct FrameCallback;

impl HostHook for FrameCallback {
    fn name(&self) -> &str {
        "frame-callback"
    }

    fn release(&mut self) {
        println!("   ✓ Frame callback released");
    }
}

fn main() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    GANTRY DIORAMA v0.1.0");
    println!("                         HEADLESS MODE");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => match DioramaConfig::load(&path) {
            Ok(config) => {
                println!("📄 Loaded config from {path}");
                config
            }
            Err(e) => {
                eprintln!("   ✗ FATAL: {e}");
                process::exit(1);
            }
        },
        None => {
            println!("📄 Using the built-in diorama");
            DioramaConfig::default()
        }
    };
    let seconds: f32 = match args.next().map(|s| s.parse::<f32>()) {
        None => 60.0,
        Some(Ok(seconds)) => seconds,
        Some(Err(e)) => {
            eprintln!("   ✗ FATAL: bad duration: {e}");
            process::exit(1);
        }
    };

    let mut diorama = match Diorama::new(&config) {
        Ok(diorama) => diorama,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            process::exit(1);
        }
    };

    diorama.add_host_hook(Box::new(FrameCallback));

    println!("   Seed:        {}", config.crane.seed);
    println!("   Tick rate:   {} Hz", config.crane.timing.tick_rate);
    println!("   Cycle:       {:.2} s", config.crane.speeds.cycle_seconds());
    println!("   Birds:       {}", config.sky.birds.len());
    println!("   Reduced:     {}", config.reduced_motion);
    println!();
    println!("🏗️  Running {seconds:.0} simulated seconds...");

    let mut elapsed = 0.0f32;
    let mut frames = 0u64;
    let mut max_ticks = 0u32;
    while elapsed < seconds {
        let delta = CADENCE[(frames % CADENCE.len() as u64) as usize];
        let frame = diorama.frame(delta);
        max_ticks = max_ticks.max(frame.ticks);
        elapsed += delta;
        frames += 1;
    }

    let last = diorama.frame(0.0);
    println!();
    diorama.shutdown();

    let engine = diorama.engine();
    let stats = engine.stats();
    println!();
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Frames:          {frames}");
    println!("  Ticks:           {}", stats.ticks);
    println!("  Max ticks/frame: {max_ticks}");
    println!("  Phase changes:   {}", stats.phase_changes);
    println!("  Cycles:          {}", stats.cycles);
    println!("  Final phase:     {}", last.phase);
    println!("  Empty cell:      {}", engine.grid().empty_cell());
    println!("  Grid consistent: {}", engine.grid().occupancy_is_consistent());
    for id in 0..8 {
        if let Some(block) = engine.grid().block(BlockId(id)) {
            println!("    {} at {} ({:?})", block.id(), block.cell(), block.parent());
        }
    }
    println!("═══════════════════════════════════════════════════════════════════");
}
