//! radiation_necrosis: radiation-induced necrosis in brain tissue.
//!
//! 3 000 healthy cells (70 % neurons, 30 % glia) and three 80-cell tumor
//! metastases receive a single 30 Gy fraction at step 20.  Each step is five
//! hours of tissue time, so 500 steps cover roughly 104 days.  Cells respond
//! through three behaviors: the dose itself, cell dynamics (metabolism,
//! hypoxia, repair, linear-quadratic death, proliferation), and an
//! inflammatory response that recruits activated microglia.
//!
//! Set `RUST_LOG=info` to see milestone censuses, `RUST_LOG=debug` for
//! per-step summaries.

mod behaviors;
mod census;
mod model;
mod tissue;

#[cfg(test)]
mod tests;

use std::time::Instant;

use anyhow::Result;

use cs_agent::AgentStoreBuilder;
use cs_core::{SimConfig, SimRng};
use cs_sim::SimBuilder;

use behaviors::tissue_behaviors;
use census::{Census, MilestoneObserver};
use model::{CellType, RadiationParams};
use tissue::TissueLayout;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:        u64   = 42;
const TOTAL_STEPS: u64   = 500;
/// Hard backstop above the behaviors' own population caps.
const MAX_AGENTS:  usize = 5_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let params = RadiationParams::default();
    let layout = TissueLayout::default();

    println!("=== radiation_necrosis: cellsim validation model ===");
    println!(
        "Cells: {}  |  Dose: {} Gy at step {}  |  Steps: {TOTAL_STEPS}  |  Seed: {SEED}",
        layout.total_cells(),
        params.dose,
        params.treatment_step
    );
    println!();

    // 1. Tissue.
    let mut setup_rng = SimRng::new(SEED);
    let cells = tissue::build(&layout, &mut setup_rng)?;
    let (store, rngs) = AgentStoreBuilder::new(SEED).agents(cells).build();

    // 2. Sim.
    let config = SimConfig {
        total_steps:           TOTAL_STEPS,
        time_step:             1.0,
        seed:                  SEED,
        num_threads:           None,
        output_interval_steps: 1,
        max_agents:            Some(MAX_AGENTS),
    };
    let mut sim = SimBuilder::new(config, store, rngs)
        .same_behaviors(tissue_behaviors(params))
        .build()?;

    // 3. Run.
    let mut observer = MilestoneObserver::new(params.treatment_step, TOTAL_STEPS - 1);
    let t0 = Instant::now();
    sim.run(&mut observer)?;
    let elapsed = t0.elapsed();

    // 4. Summary.
    let census = Census::take(sim.agents().cells().exts());
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  spawned: {}  |  cleared: {}  |  necrotic fraction: {:.1} %",
        observer.spawned,
        observer.cleared,
        census.necrotic_fraction() * 100.0
    );
    println!();

    println!("{:>6} {:>8} {:>8} {:>10} {:>13}", "Step", "Cells", "Tumor", "Necrotic", "Inflammatory");
    println!("{}", "-".repeat(49));
    for (step, c) in &observer.history {
        println!(
            "{:>6} {:>8} {:>8} {:>10} {:>13}",
            step.0,
            c.total(),
            c.count(CellType::Tumor),
            c.count(CellType::Necrotic),
            c.count(CellType::Inflammatory),
        );
    }
    println!();

    println!("{:<14} {:>8}", "Cell type", "Count");
    println!("{}", "-".repeat(23));
    for cell_type in CellType::ALL {
        println!("{:<14} {:>8}", cell_type.to_string(), census.count(cell_type));
    }
    println!("{}", "-".repeat(23));
    println!("{:<14} {:>8}", "total", census.total());
    println!();
    println!("Mean damage (living):       {:.2}", census.mean_damage);
    println!("Mean inflammation (living): {:.3}", census.mean_inflammation);

    Ok(())
}
