//! Boundary and coupling conditions for vessel networks.
//!
//! Every vessel end is either an inlet, an outlet, or part of a junction:
//!
//! | End | Condition |
//! |-----|-----------|
//! | Inlet (x = 0) | prescribed flow or pressure waveform |
//! | Outlet (x = L) | three-element Windkessel |
//! | Bifurcation | parent end coupled to two daughter starts (6 unknowns) |
//! | Conjunction | one vessel end coupled to the next vessel start (4 unknowns) |
//!
//! Junctions are resolved by the Newton solver from a residual and its
//! Jacobian; inlet and outlet conditions write the boundary node of the new
//! time level directly.

mod arterial;
mod junction;

pub use arterial::{ArterialBoundaries, Inlet, Waveform, WINDKESSEL_MAX_ITERATIONS, WINDKESSEL_TOLERANCE};
pub use junction::{JunctionEnd, junction_jacobian, junction_residual};

use crate::equations::PdeModel;
use crate::mesh::Vessel;
use crate::solver::{SolverResult, VesselState};

/// Context passed to inlet and outlet conditions.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryContext<'a> {
    /// State at the known time level n
    pub prev: &'a VesselState,
    /// Time of the level being computed
    pub time: f64,
    /// Node spacing of the vessel
    pub dx: f64,
    /// Time step
    pub dt: f64,
    /// The vessel this boundary belongs to
    pub vessel: &'a Vessel,
}

/// Initial state, end conditions and junction equations of a network.
///
/// Junction methods receive:
/// - `x`: trial values at the coupled nodes, as (A, q) pairs in junction order
/// - `u`: the freshly advanced values at the neighbouring interior nodes, same layout
/// - `vessels`: the vessels in junction order (parent first for bifurcations)
pub trait BoundaryConditions<P: PdeModel>: Send + Sync {
    /// Initial state of a vessel.
    fn initial_condition(&self, model: &P, vessel: &Vessel) -> VesselState;

    /// Apply the inlet condition to the first node of `next`.
    fn inlet(&self, model: &P, ctx: &BoundaryContext<'_>, next: &mut VesselState) -> SolverResult<()>;

    /// Apply the outlet condition to the last node of `next`.
    fn outlet(&self, model: &P, ctx: &BoundaryContext<'_>, next: &mut VesselState) -> SolverResult<()>;

    /// Residual of the 6 bifurcation equations.
    fn bifurcation_residual(&self, model: &P, x: &[f64], u: &[f64], dt: f64, vessels: [&Vessel; 3]) -> Vec<f64>;

    /// Jacobian (6×6, by rows) of the bifurcation equations.
    fn bifurcation_jacobian(
        &self,
        model: &P,
        x: &[f64],
        u: &[f64],
        dt: f64,
        vessels: [&Vessel; 3],
    ) -> Vec<Vec<f64>>;

    /// Residual of the 4 conjunction equations.
    fn conjunction_residual(&self, model: &P, x: &[f64], u: &[f64], dt: f64, vessels: [&Vessel; 2]) -> Vec<f64>;

    /// Jacobian (4×4, by rows) of the conjunction equations.
    fn conjunction_jacobian(
        &self,
        model: &P,
        x: &[f64],
        u: &[f64],
        dt: f64,
        vessels: [&Vessel; 2],
    ) -> Vec<Vec<f64>>;

    /// Human-readable name.
    fn name(&self) -> &'static str {
        "boundary conditions"
    }
}
