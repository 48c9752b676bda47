//! Coupling equations at vessel junctions.
//!
//! A junction joins one incoming vessel end (its last node) to one or more
//! outgoing vessel starts (their first node). With unknowns (A, q) at each
//! coupled node, the system is:
//!
//! 1. mass conservation: −q_in + Σ q_out = 0
//! 2. total-pressure continuity between the incoming end and each outgoing
//!    start: −(½ρ(q/A)² + p)_in + (½ρ(q/A)² + p)_out = 0
//! 3. one outgoing characteristic per coupled node, W = q/A ± 4c, carried
//!    from the neighbouring interior node of the new time level
//!
//! The Jacobian uses the elastic tube law derivatives
//! dp/dA = f/(2√(A0·A)) and d(4c)/dA = √(f/(2ρ√A0)) · A^{-3/4}.

use crate::equations::PdeModel;
use crate::mesh::Vessel;

/// One coupled vessel node in a junction.
#[derive(Clone, Copy, Debug)]
pub struct JunctionEnd<'a> {
    /// Vessel the node belongs to
    pub vessel: &'a Vessel,
    /// Index of the coupled node
    pub node: usize,
    /// Index of the neighbouring interior node
    pub interior: usize,
    /// +1 for an incoming end (W1 = q/A + 4c), −1 for an outgoing start (W2 = q/A − 4c)
    pub sign: f64,
}

impl<'a> JunctionEnd<'a> {
    /// Last node of a vessel flowing into the junction.
    pub fn incoming(vessel: &'a Vessel) -> Self {
        let n = vessel.n_nodes();
        Self {
            vessel,
            node: n - 1,
            interior: n - 2,
            sign: 1.0,
        }
    }

    /// First node of a vessel flowing out of the junction.
    pub fn outgoing(vessel: &'a Vessel) -> Self {
        Self {
            vessel,
            node: 0,
            interior: 1,
            sign: -1.0,
        }
    }

    fn f(&self) -> f64 {
        self.vessel.f_r0()[self.node]
    }

    fn a0(&self) -> f64 {
        self.vessel.a0(self.node)
    }
}

/// Residual of a junction with `ends[0]` incoming and the rest outgoing.
///
/// Row order: mass, pressure continuity for each outgoing end, then one
/// characteristic per end in `ends` order.
pub fn junction_residual<P: PdeModel>(model: &P, ends: &[JunctionEnd<'_>], x: &[f64], u: &[f64]) -> Vec<f64> {
    let rho = model.density();
    let m = ends.len();
    let mut r = Vec::with_capacity(2 * m);

    let total_pressure = |k: usize| {
        let (a, q) = (x[2 * k], x[2 * k + 1]);
        0.5 * rho * (q / a).powi(2) + model.elastic_pressure_at(a, ends[k].node, ends[k].vessel)
    };

    r.push(-x[1] + (1..m).map(|k| x[2 * k + 1]).sum::<f64>());

    let incoming = total_pressure(0);
    for k in 1..m {
        r.push(-incoming + total_pressure(k));
    }

    for (k, end) in ends.iter().enumerate() {
        let (a, q) = (x[2 * k], x[2 * k + 1]);
        let (ua, uq) = (u[2 * k], u[2 * k + 1]);
        let c = model.wave_speed_at(a, end.node, end.vessel);
        let c_int = model.wave_speed_at(ua, end.interior, end.vessel);
        r.push(-(q / a + end.sign * 4.0 * c) + (uq / ua + end.sign * 4.0 * c_int));
    }

    r
}

/// Analytic Jacobian of [`junction_residual`].
pub fn junction_jacobian<P: PdeModel>(model: &P, ends: &[JunctionEnd<'_>], x: &[f64]) -> Vec<Vec<f64>> {
    let rho = model.density();
    let m = ends.len();
    let n = 2 * m;
    let mut jac = Vec::with_capacity(n);

    // d(½ρ(q/A)² + p)/dA and /dq at end k
    let pressure_derivs = |k: usize| {
        let (a, q) = (x[2 * k], x[2 * k + 1]);
        let end = &ends[k];
        let dp_da = 0.5 * end.f() / end.a0().sqrt() / a.sqrt();
        (-rho * q * q / (a * a * a) + dp_da, rho * q / (a * a))
    };

    let mut mass = vec![0.0; n];
    mass[1] = -1.0;
    for k in 1..m {
        mass[2 * k + 1] = 1.0;
    }
    jac.push(mass);

    let (in_da, in_dq) = pressure_derivs(0);
    for k in 1..m {
        let (da, dq) = pressure_derivs(k);
        let mut row = vec![0.0; n];
        row[0] = -in_da;
        row[1] = -in_dq;
        row[2 * k] = da;
        row[2 * k + 1] = dq;
        jac.push(row);
    }

    for (k, end) in ends.iter().enumerate() {
        let (a, q) = (x[2 * k], x[2 * k + 1]);
        let d4c = (0.5 * end.f() / (rho * end.a0().sqrt())).sqrt() * a.powf(-0.75);
        let mut row = vec![0.0; n];
        row[2 * k] = q / (a * a) - end.sign * d4c;
        row[2 * k + 1] = -1.0 / a;
        jac.push(row);
    }

    jac
}
