//! CFL stability gate.
//!
//! An explicit step on a vessel is accepted when
//!
//! Δt/Δx < 1 / max_i |u_i + c_i|
//!
//! with u = q/A the mean velocity and c the local wave speed. The inequality
//! is strict: equality counts as a violation.

use crate::equations::PdeModel;
use crate::mesh::Vessel;

use super::state::VesselState;

/// Largest admissible Δt/Δx for the given velocities and wave speeds.
///
/// Returns `f64::INFINITY` when every characteristic speed is zero and `0.0`
/// when any speed is non-finite, so a diverged state never passes the gate.
pub fn courant_limit(velocity: &[f64], wave_speed: &[f64]) -> f64 {
    let mut limit = f64::INFINITY;
    for (u, c) in velocity.iter().zip(wave_speed) {
        let speed = (u + c).abs();
        if !speed.is_finite() {
            return 0.0;
        }
        limit = limit.min(1.0 / speed);
    }
    limit
}

/// Strict CFL test on raw velocity and wave-speed arrays.
pub fn cfl_condition(velocity: &[f64], wave_speed: &[f64], dx: f64, dt: f64) -> bool {
    dt / dx < courant_limit(velocity, wave_speed)
}

/// Strict CFL test for one vessel state.
pub fn cfl_ok<P: PdeModel>(model: &P, state: &VesselState, dx: f64, dt: f64, vessel: &Vessel) -> bool {
    let (_, limit) = courant_numbers(model, state, dx, dt, vessel);
    dt / dx < limit
}

/// Δt/Δx and its admissible limit for one vessel state.
pub fn courant_numbers<P: PdeModel>(
    model: &P,
    state: &VesselState,
    dx: f64,
    dt: f64,
    vessel: &Vessel,
) -> (f64, f64) {
    let c = model.wave_speed(&state.a, vessel);
    let u: Vec<f64> = state.q.iter().zip(&state.a).map(|(q, a)| q / a).collect();
    (dt / dx, courant_limit(&u, &c))
}
