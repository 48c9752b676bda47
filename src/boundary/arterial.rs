//! Boundary conditions for arterial networks.
//!
//! - Inlet: prescribed flow q(t) or pressure p(t) at x = 0
//! - Outlet: three-element Windkessel (R1-Ct-Rt) at x = L, solved by
//!   fixed-point iteration on the outlet pressure
//! - Junctions: mass, total pressure and characteristics (see [`super::junction`])

use log::debug;

use crate::equations::PdeModel;
use crate::mesh::Vessel;
use crate::solver::{SolverError, SolverResult, VesselState};

use super::junction::{JunctionEnd, junction_jacobian, junction_residual};
use super::{BoundaryConditions, BoundaryContext};

/// Time-dependent boundary signal.
pub type Waveform = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// Outlet pressure tolerance of the Windkessel iteration [Pa].
pub const WINDKESSEL_TOLERANCE: f64 = 1e-7;

/// Maximum number of Windkessel fixed-point sweeps.
pub const WINDKESSEL_MAX_ITERATIONS: usize = 1000;

/// Inlet condition.
pub enum Inlet {
    /// Prescribed volumetric flow rate q(t)
    Flow(Waveform),
    /// Prescribed pressure p(t)
    Pressure(Waveform),
}

impl Inlet {
    /// Prescribed flow inlet.
    pub fn flow(waveform: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Flow(Box::new(waveform))
    }

    /// Prescribed pressure inlet.
    pub fn pressure(waveform: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Pressure(Box::new(waveform))
    }
}

impl std::fmt::Debug for Inlet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flow(_) => f.write_str("Inlet::Flow"),
            Self::Pressure(_) => f.write_str("Inlet::Pressure"),
        }
    }
}

/// Inlet waveform, Windkessel outlets and elastic junctions.
///
/// The initial state is the unstressed vessel at rest: A = π r0², q = 0.
#[derive(Debug)]
pub struct ArterialBoundaries {
    inlet: Inlet,
}

impl ArterialBoundaries {
    /// Create boundary conditions with the given inlet.
    pub fn new(inlet: Inlet) -> Self {
        Self { inlet }
    }

    /// The inlet condition.
    pub fn inlet_condition(&self) -> &Inlet {
        &self.inlet
    }
}

impl<P: PdeModel> BoundaryConditions<P> for ArterialBoundaries {
    fn initial_condition(&self, _model: &P, vessel: &Vessel) -> VesselState {
        let n = vessel.n_nodes();
        VesselState {
            a: (0..n).map(|i| vessel.a0(i)).collect(),
            q: vec![0.0; n],
        }
    }

    fn inlet(&self, model: &P, ctx: &BoundaryContext<'_>, next: &mut VesselState) -> SolverResult<()> {
        let theta = ctx.dt / ctx.dx;
        match &self.inlet {
            Inlet::Flow(q_in) => {
                let q_pres = q_in(ctx.time);
                // Continuity with a one-sided difference over the first cell.
                next.a[0] -= 2.0 * theta * (next.q[1] - q_pres);
                next.q[0] = q_pres;
            }
            Inlet::Pressure(p_in) => {
                let vessel = ctx.vessel;
                let prev = ctx.prev;
                let p_pres = p_in(ctx.time);
                let a0 = vessel.a0(0);
                let f = vessel.f_r0()[0];
                let a = a0 * (p_pres / f + 1.0).powi(2);

                // Outgoing characteristic W2 = q/A - 4c, traced back along λ2 = q/A - c.
                let c0 = model.wave_speed_at(prev.a[0], 0, vessel);
                let c1 = model.wave_speed_at(prev.a[1], 1, vessel);
                let w2_0 = prev.velocity(0) - 4.0 * c0;
                let w2_1 = prev.velocity(1) - 4.0 * c1;
                let foot = -(prev.velocity(0) - c0) * ctx.dt;
                let w2 = linear_extrapolation(foot, 0.0, ctx.dx, w2_0, w2_1);

                next.a[0] = a;
                next.q[0] = a * (w2 + 4.0 * model.wave_speed_at(a, 0, vessel));
            }
        }
        Ok(())
    }

    fn outlet(&self, model: &P, ctx: &BoundaryContext<'_>, next: &mut VesselState) -> SolverResult<()> {
        let vessel = ctx.vessel;
        let wk = vessel.windkessel().ok_or_else(|| {
            SolverError::MissingBoundaryData(format!("outlet vessel {} has no Windkessel", vessel.index()))
        })?;

        let last = ctx.prev.last();
        let a_n = ctx.prev.a[last];
        let q_n = ctx.prev.q[last];
        let q_m1 = next.q[last - 1];
        let theta = ctx.dt / ctx.dx;
        let x = ctx.dt / (wk.r1 * wk.rt * wk.ct);

        let p_out = model.elastic_pressure_at(a_n, last, vessel);
        let mut p0 = p_out;
        let mut a_out = a_n;
        let mut q_out = q_n;
        let mut converged = false;

        for _ in 0..WINDKESSEL_MAX_ITERATIONS {
            let p_old = p0;
            q_out = x * p_out - x * (wk.r1 + wk.rt) * q_n + (p0 - p_out) / wk.r1 + q_n;
            a_out = a_n - theta * (q_out - q_m1);
            p0 = model.elastic_pressure_at(a_out, last, vessel);
            if (p_old - p0).abs() < WINDKESSEL_TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged {
            debug!(
                "Windkessel iteration at outlet {} stopped after {} sweeps",
                vessel.index(),
                WINDKESSEL_MAX_ITERATIONS
            );
        }

        next.a[last] = a_out;
        next.q[last] = q_out;
        Ok(())
    }

    fn bifurcation_residual(&self, model: &P, x: &[f64], u: &[f64], _dt: f64, vessels: [&Vessel; 3]) -> Vec<f64> {
        let ends = bifurcation_ends(vessels);
        junction_residual(model, &ends, x, u)
    }

    fn bifurcation_jacobian(
        &self,
        model: &P,
        x: &[f64],
        _u: &[f64],
        _dt: f64,
        vessels: [&Vessel; 3],
    ) -> Vec<Vec<f64>> {
        let ends = bifurcation_ends(vessels);
        junction_jacobian(model, &ends, x)
    }

    fn conjunction_residual(&self, model: &P, x: &[f64], u: &[f64], _dt: f64, vessels: [&Vessel; 2]) -> Vec<f64> {
        let ends = [JunctionEnd::incoming(vessels[0]), JunctionEnd::outgoing(vessels[1])];
        junction_residual(model, &ends, x, u)
    }

    fn conjunction_jacobian(
        &self,
        model: &P,
        x: &[f64],
        _u: &[f64],
        _dt: f64,
        vessels: [&Vessel; 2],
    ) -> Vec<Vec<f64>> {
        let ends = [JunctionEnd::incoming(vessels[0]), JunctionEnd::outgoing(vessels[1])];
        junction_jacobian(model, &ends, x)
    }

    fn name(&self) -> &'static str {
        "arterial"
    }
}

fn bifurcation_ends(vessels: [&Vessel; 3]) -> [JunctionEnd<'_>; 3] {
    [
        JunctionEnd::incoming(vessels[0]),
        JunctionEnd::outgoing(vessels[1]),
        JunctionEnd::outgoing(vessels[2]),
    ]
}

/// Straight line through (x1, y1) and (x2, y2) evaluated at `x`.
#[inline]
fn linear_extrapolation(x: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}
