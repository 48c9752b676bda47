//! Explicit advance operators for the interior nodes of one vessel.
//!
//! All schemes solve ∂U/∂t + ∂F/∂x = S on a uniform grid with θ = Δt/Δx:
//!
//! **Two-step Lax-Wendroff**
//!
//! ```text
//! U*_{i∓½} = ½(U_i + U_{i∓1}) ∓ ½θ(F_i − F_{i∓1}) + ¼Δt(S_i + S_{i∓1})
//! U^{n+1}_i = U_i − θ(F*_{i+½} − F*_{i−½}) + ½Δt(S*_{i+½} + S*_{i−½})
//! ```
//!
//! **MacCormack**
//!
//! ```text
//! U*_i      = U_i − θ(F_{i+1} − F_i) + Δt S_i
//! U^{n+1}_i = ½(U_i + U*_i − θ(F*_i − F*_{i−1}) + Δt S*_i)
//! ```
//!
//! The predictor at the last node uses the mirrored difference
//! F_{N−2} − F_{N−1}, which is kept as is.
//!
//! **MacCormack + Godunov splitting** runs MacCormack and then an implicit
//! diffusive correction of the flow rate driven by the wall-viscosity
//! compliance, see [`Scheme::split_step`].
//!
//! Nodes a scheme does not update keep the value of the known time level;
//! boundary conditions and junctions set them afterwards.

use crate::equations::{FaceOffset, PdeModel};
use crate::mesh::Vessel;

use super::error::SolverResult;
use super::state::VesselState;
use super::tridiag::thomas_solve_into;

/// Time-stepping scheme for the hyperbolic part.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scheme {
    /// Two-step Lax-Wendroff
    LaxWendroff,
    /// MacCormack predictor-corrector
    #[default]
    MacCormack,
    /// MacCormack followed by an implicit viscous flow-rate correction
    MacCormackGodunov {
        /// Implicit weight of the split step (1 = fully implicit)
        theta: f64,
    },
}

impl Scheme {
    /// MacCormack with a fully implicit split step.
    pub fn maccormack_godunov() -> Self {
        Self::MacCormackGodunov { theta: 1.0 }
    }

    /// Whether the scheme applies a split step after junction resolution.
    pub fn is_split(&self) -> bool {
        matches!(self, Self::MacCormackGodunov { .. })
    }

    /// Scheme name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LaxWendroff => "Lax-Wendroff",
            Self::MacCormack => "MacCormack",
            Self::MacCormackGodunov { .. } => "MacCormack-Godunov",
        }
    }

    /// Compute the provisional next state of one vessel from `prev`.
    ///
    /// `next` is overwritten entirely: updated nodes get the scheme value,
    /// the others the value in `prev`.
    pub fn advance<P: PdeModel>(
        &self,
        model: &P,
        prev: &VesselState,
        dt: f64,
        vessel: &Vessel,
        ws: &mut SchemeWorkspace,
        next: &mut VesselState,
    ) {
        match self {
            Self::LaxWendroff => lax_wendroff(model, prev, dt, vessel, ws, next),
            Self::MacCormack | Self::MacCormackGodunov { .. } => maccormack(model, prev, dt, vessel, ws, next),
        }
    }

    /// Apply the split diffusive step to `candidate`, writing the result to `out`.
    ///
    /// For unsplit schemes `out` becomes a copy of `candidate`. For the
    /// Godunov variant the area is kept and the interior flow rate solves
    ///
    /// ```text
    /// (1 + γθ F(a₊ + a₋)) q_i − γθ F a₋ q_{i−1} − γθ F a₊ q_{i+1} = rhs_i,  γ = A_i/ρ, F = Δt/Δx²
    /// ```
    ///
    /// where a± are compliance averages at the half nodes. The first and last
    /// interior rows drop their coupling to the end nodes.
    pub fn split_step<P: PdeModel>(
        &self,
        model: &P,
        candidate: &VesselState,
        dt: f64,
        vessel: &Vessel,
        ws: &mut SchemeWorkspace,
        out: &mut VesselState,
    ) -> SolverResult<()> {
        out.copy_from(candidate);
        if let Self::MacCormackGodunov { theta } = *self {
            godunov_split(model, candidate, dt, vessel, theta, ws, out)?;
        }
        Ok(())
    }
}

/// Scratch buffers reused across time steps for one vessel.
#[derive(Clone, Debug, Default)]
pub struct SchemeWorkspace {
    flux: VesselState,
    source: VesselState,
    stage_a: VesselState,
    stage_b: VesselState,
    stage_a_flux: VesselState,
    stage_a_source: VesselState,
    stage_b_flux: VesselState,
    stage_b_source: VesselState,
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<f64>,
    solution: Vec<f64>,
}

impl SchemeWorkspace {
    /// Allocate buffers for a vessel with `n` nodes.
    pub fn new(n: usize) -> Self {
        let m = n.saturating_sub(2);
        Self {
            flux: VesselState::zeros(n),
            source: VesselState::zeros(n),
            stage_a: VesselState::zeros(n),
            stage_b: VesselState::zeros(n),
            stage_a_flux: VesselState::zeros(n),
            stage_a_source: VesselState::zeros(n),
            stage_b_flux: VesselState::zeros(n),
            stage_b_source: VesselState::zeros(n),
            lower: vec![0.0; m.saturating_sub(1)],
            diag: vec![0.0; m],
            upper: vec![0.0; m.saturating_sub(1)],
            rhs: vec![0.0; m],
            solution: vec![0.0; m],
        }
    }
}

fn lax_wendroff<P: PdeModel>(
    model: &P,
    prev: &VesselState,
    dt: f64,
    vessel: &Vessel,
    ws: &mut SchemeWorkspace,
    next: &mut VesselState,
) {
    let n = prev.n_nodes();
    let theta = dt / vessel.dx();
    let dt2 = 0.5 * dt;

    model.flux(prev, FaceOffset::Node, vessel, &mut ws.flux);
    model.source(prev, FaceOffset::Node, vessel, &mut ws.source);

    // Half-face predictors; the end faces keep the known state.
    ws.stage_a.copy_from(prev);
    ws.stage_b.copy_from(prev);
    {
        let u = prev.rows();
        let f = ws.flux.rows();
        let s = ws.source.rows();
        let minus = ws.stage_a.rows_mut();
        let plus = ws.stage_b.rows_mut();
        for (r, (mh, ph)) in minus.into_iter().zip(plus).enumerate() {
            let (u, f, s) = (u[r], f[r], s[r]);
            for i in 1..n - 1 {
                mh[i] = 0.5 * (u[i] + u[i - 1]) - 0.5 * theta * (f[i] - f[i - 1]) + 0.5 * dt2 * (s[i] + s[i - 1]);
                ph[i] = 0.5 * (u[i + 1] + u[i]) - 0.5 * theta * (f[i + 1] - f[i]) + 0.5 * dt2 * (s[i + 1] + s[i]);
            }
        }
    }

    model.flux(&ws.stage_a, FaceOffset::MinusHalf, vessel, &mut ws.stage_a_flux);
    model.source(&ws.stage_a, FaceOffset::MinusHalf, vessel, &mut ws.stage_a_source);
    model.flux(&ws.stage_b, FaceOffset::PlusHalf, vessel, &mut ws.stage_b_flux);
    model.source(&ws.stage_b, FaceOffset::PlusHalf, vessel, &mut ws.stage_b_source);

    next.copy_from(prev);
    let u = prev.rows();
    let f_mh = ws.stage_a_flux.rows();
    let s_mh = ws.stage_a_source.rows();
    let f_ph = ws.stage_b_flux.rows();
    let s_ph = ws.stage_b_source.rows();
    for (r, out) in next.rows_mut().into_iter().enumerate() {
        for i in 1..n - 1 {
            out[i] = u[r][i] - theta * (f_ph[r][i] - f_mh[r][i]) + dt2 * (s_ph[r][i] + s_mh[r][i]);
        }
    }
}

fn maccormack<P: PdeModel>(
    model: &P,
    prev: &VesselState,
    dt: f64,
    vessel: &Vessel,
    ws: &mut SchemeWorkspace,
    next: &mut VesselState,
) {
    let n = prev.n_nodes();
    let theta = dt / vessel.dx();

    model.flux(prev, FaceOffset::Node, vessel, &mut ws.flux);
    model.source(prev, FaceOffset::Node, vessel, &mut ws.source);

    {
        let u = prev.rows();
        let f = ws.flux.rows();
        let s = ws.source.rows();
        for (r, star) in ws.stage_a.rows_mut().into_iter().enumerate() {
            let (u, f, s) = (u[r], f[r], s[r]);
            for i in 0..n - 1 {
                star[i] = u[i] - theta * (f[i + 1] - f[i]) + dt * s[i];
            }
            // Mirrored difference at the last node.
            star[n - 1] = u[n - 1] - theta * (f[n - 2] - f[n - 1]) + dt * s[n - 1];
        }
    }

    model.flux(&ws.stage_a, FaceOffset::Node, vessel, &mut ws.stage_a_flux);
    model.source(&ws.stage_a, FaceOffset::Node, vessel, &mut ws.stage_a_source);

    next.copy_from(prev);
    let u = prev.rows();
    let star = ws.stage_a.rows();
    let f_star = ws.stage_a_flux.rows();
    let s_star = ws.stage_a_source.rows();
    for (r, out) in next.rows_mut().into_iter().enumerate() {
        for i in 1..n {
            out[i] = 0.5 * (u[r][i] + star[r][i] - theta * (f_star[r][i] - f_star[r][i - 1]) + dt * s_star[r][i]);
        }
    }
}

fn godunov_split<P: PdeModel>(
    model: &P,
    u: &VesselState,
    dt: f64,
    vessel: &Vessel,
    theta: f64,
    ws: &mut SchemeWorkspace,
    out: &mut VesselState,
) -> SolverResult<()> {
    let n = u.n_nodes();
    if n < 3 {
        return Ok(());
    }
    let m = n - 2;
    let rho = model.density();
    let dx = vessel.dx();
    let big_f = dt / (dx * dx);
    let c = model.compliance(&u.a, vessel.wall_thickness(), vessel);
    let a = &u.a;
    let q = &u.q;

    let a_ph = |j: usize| 0.5 * (c[j + 1] + c[j + 2]);
    let a_mh = |j: usize| 0.5 * (c[j + 1] + c[j]);

    for j in 0..m {
        let g = a[j + 1] / rho;
        ws.diag[j] = 1.0 + g * theta * big_f * (a_ph(j) + a_mh(j));

        let gamma = g * (1.0 - theta);
        ws.rhs[j] = gamma * big_f * a_mh(j) * q[j]
            + (1.0 - gamma * big_f * (a_mh(j) + a_ph(j))) * q[j + 1]
            + gamma * big_f * a_ph(j) * q[j + 2];
    }
    for j in 0..m - 1 {
        ws.lower[j] = -(a[j + 2] / rho) * theta * big_f * a_mh(j + 1);
        ws.upper[j] = -(a[j + 1] / rho) * theta * big_f * a_ph(j);
    }
    // One-sided end rows.
    ws.diag[0] -= (a[1] / rho) * theta * big_f * a_mh(0);
    ws.diag[m - 1] -= (a[n - 2] / rho) * theta * big_f * a_ph(m - 1);

    thomas_solve_into(&ws.lower, &ws.diag, &ws.upper, &ws.rhs, &mut ws.solution)?;
    out.q[1..n - 1].copy_from_slice(&ws.solution);
    Ok(())
}
