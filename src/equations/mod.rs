//! Tube-law models for one-dimensional pulse-wave propagation.
//!
//! Each model closes the balance laws for area A and flow rate q
//!
//! ∂U/∂t + ∂F(U)/∂x = S(U, x),  U = (A, q)
//!
//! with a constitutive pressure-area relation for the vessel wall. The time
//! stepping schemes only see the model through [`PdeModel`].

mod elastic_tube;
mod viscoelastic_tube;

pub use elastic_tube::{BLOOD_DENSITY, BLOOD_VISCOSITY, ElasticTube};
pub use viscoelastic_tube::ViscoelasticTube;

pub use crate::mesh::FaceOffset;

use crate::mesh::Vessel;
use crate::solver::VesselState;

/// Flux, source and wall mechanics of a 1D vessel model.
///
/// Node-wise methods are the required surface; the whole-vessel variants
/// have default implementations that loop over nodes.
///
/// `node` indexes the vessel's sampled geometry at the requested
/// [`FaceOffset`], so `flux_at(.., i, FaceOffset::PlusHalf, ..)` evaluates
/// the flux at x_i + dx/2.
pub trait PdeModel: Clone + Send + Sync {
    /// Fluid density ρ.
    fn density(&self) -> f64;

    /// Physical flux F(A, q) at one node.
    fn flux_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2];

    /// Source term S(A, q) at one node.
    fn source_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2];

    /// Local pulse-wave speed c(A) at a node.
    fn wave_speed_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64;

    /// Elastic pressure p(A) at a node (no wall-viscosity contribution).
    fn elastic_pressure_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64;

    /// Flux over a whole vessel.
    fn flux(&self, u: &VesselState, offset: FaceOffset, vessel: &Vessel, out: &mut VesselState) {
        for i in 0..u.n_nodes() {
            let [f0, f1] = self.flux_at(u.a[i], u.q[i], i, offset, vessel);
            out.a[i] = f0;
            out.q[i] = f1;
        }
    }

    /// Source over a whole vessel.
    fn source(&self, u: &VesselState, offset: FaceOffset, vessel: &Vessel, out: &mut VesselState) {
        for i in 0..u.n_nodes() {
            let [s0, s1] = self.source_at(u.a[i], u.q[i], i, offset, vessel);
            out.a[i] = s0;
            out.q[i] = s1;
        }
    }

    /// Wave speed at every node.
    fn wave_speed(&self, a: &[f64], vessel: &Vessel) -> Vec<f64> {
        a.iter()
            .enumerate()
            .map(|(i, &ai)| self.wave_speed_at(ai, i, vessel))
            .collect()
    }

    /// Reported pressure at every node.
    fn pressure(&self, u: &VesselState, vessel: &Vessel) -> Vec<f64> {
        u.a.iter()
            .enumerate()
            .map(|(i, &ai)| self.elastic_pressure_at(ai, i, vessel))
            .collect()
    }

    /// Wall-viscosity compliance used by the split diffusive step.
    ///
    /// Purely elastic models have none.
    fn compliance(&self, a: &[f64], wall_thickness: &[f64], vessel: &Vessel) -> Vec<f64> {
        let _ = (wall_thickness, vessel);
        vec![0.0; a.len()]
    }

    /// Receive the simulated period and cycle count.
    ///
    /// Models with a Womersley-type boundary layer size it from the cycle
    /// period T/cycles.
    fn set_cycle_period(&mut self, total_time: f64, cycles: usize) {
        let _ = (total_time, cycles);
    }
}
