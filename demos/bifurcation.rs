//! Pulse propagation through an arterial bifurcation.
//!
//! A tapered parent vessel splits into two daughters, each terminated by a
//! three-element Windkessel. The inlet receives one cardiac cycle of a
//! half-sine systolic flow pulse. Results are written to `results/` as an
//! `.npz` archive; running the demo a second time with the same Δt and T
//! is served from that archive without recomputing.

use std::f64::consts::PI;

use artery_fd::prelude::*;
use artery_fd::Archive;

/// Systolic ejection over the first 0.3 s of a 1 s cycle.
fn inflow(t: f64) -> f64 {
    let t = t % 1.0;
    if t < 0.3 { 5e-4 * (PI * t / 0.3).sin() } else { 0.0 }
}

fn main() -> SolverResult<()> {
    // Parameters
    let dt = 1e-5;
    let total_time = 1.0;
    let skip_frames = 1000;
    let stiffness = WallStiffness::default();

    let parent = Vessel::tapered(VesselIndex::new(0), 0.2, 101, 0.0125, 0.011, stiffness)?;
    let left = Vessel::uniform(VesselIndex::new(1), 0.15, 76, 0.008, stiffness)?
        .with_windkessel(Windkessel::new(6.8e7, 1.2e9, 8e-10));
    let right = Vessel::uniform(VesselIndex::new(2), 0.12, 61, 0.007, stiffness)?
        .with_windkessel(Windkessel::new(8.5e7, 1.5e9, 6e-10));
    let network = VesselNetwork::new(vec![parent, left, right])?;

    println!("Arterial bifurcation");
    println!("====================");
    for v in network.vessels() {
        let (r_in, r_out) = v.radii();
        println!(
            "{}: L = {:.3} m, {} nodes, r0 = {:.4} → {:.4} m",
            v.index(),
            v.length(),
            v.n_nodes(),
            r_in,
            r_out
        );
    }
    println!();

    let config = SolverConfig::new(Scheme::maccormack_godunov()).verbose();
    let model = ViscoelasticTube::new(ElasticTube::blood(), 2e5);
    let mut solver = FdmSolver::new(network, model, ArterialBoundaries::new(Inlet::flow(inflow)))
        .with_config(config)
        .with_cache(ArchiveCache::new("results"));
    solver.configure_time(dt, total_time, 1)?;
    solver.configure_connectivity(Connectivity::new([0], [1, 2], [[0, 1, 2]], []))?;

    let mut recorder = ArchiveRecorder::new("results");
    let outcome = solver.solve("bifurcation", Some(&mut recorder), skip_frames)?;

    match outcome.status {
        RunStatus::Cached => {
            println!("Run {} already in results/; nothing to do.", outcome.run_id);
        }
        RunStatus::Completed => {
            println!();
            println!("Completed {} steps in {:.2?}", outcome.steps, outcome.wall_time);
            println!(
                "Junction solves: {} ({} hit the iteration cap, worst residual {:.2e})",
                outcome.junctions.solves, outcome.junctions.non_converged, outcome.junctions.worst_residual
            );
            for (v, volume) in outcome.volumes.iter().enumerate() {
                println!("V{v} final volume: {:.4e} m³", volume);
            }
        }
    }

    if let Some(path) = recorder.written() {
        let archive = Archive::read(path)?;
        println!();
        println!("Archive {}:", path.display());
        for (v, record) in &archive.vessels {
            let p_peak = record
                .pressure
                .iter()
                .flatten()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            println!("  {v}: {} frames, peak pressure {:.0} Pa", record.n_frames(), p_peak);
        }
    }

    Ok(())
}
