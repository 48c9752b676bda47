//! Elastic tube law for blood flow in compliant arteries.
//!
//! Pressure-area relation with empirical stiffness f(r0):
//!
//! p(A) = f(r0) · (√(A/A0) − 1)
//!
//! which gives the flux
//!
//! F = (q, q²/A + f/(3ρ) · A^{3/2} / √A0)
//!
//! and a source made of boundary-layer friction plus the taper force
//!
//! S₁ = −2πνRq/(δA) + (1/ρ)·(2√π f A^{3/2}/(3A0) − (⅔ A^{3/2}/√A0 − A)·df/dr0)·dr0/dx
//!
//! with R = √(A/π), ν = μ/ρ and boundary-layer thickness δ = √(ν T_cycle / 2π).

use std::f64::consts::PI;

use crate::mesh::{FaceOffset, Vessel};

use super::PdeModel;

/// Blood density [kg/m³].
pub const BLOOD_DENSITY: f64 = 1050.0;

/// Blood dynamic viscosity [Pa·s].
pub const BLOOD_VISCOSITY: f64 = 3.5e-3;

/// Cycle period assumed until the solver reports the simulated one [s].
const DEFAULT_CYCLE_PERIOD: f64 = 1.0;

/// Elastic tube model.
#[derive(Clone, Copy, Debug)]
pub struct ElasticTube {
    /// Density ρ
    pub rho: f64,
    /// Dynamic viscosity μ
    pub mu: f64,
    delta: f64,
}

impl ElasticTube {
    /// Create a model with the given density and dynamic viscosity.
    pub fn new(rho: f64, mu: f64) -> Self {
        let mut model = Self { rho, mu, delta: 0.0 };
        model.set_boundary_layer(DEFAULT_CYCLE_PERIOD);
        model
    }

    /// Model with blood properties.
    pub fn blood() -> Self {
        Self::new(BLOOD_DENSITY, BLOOD_VISCOSITY)
    }

    /// Kinematic viscosity ν = μ/ρ.
    #[inline]
    pub fn nu(&self) -> f64 {
        self.mu / self.rho
    }

    /// Boundary-layer thickness δ.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    fn set_boundary_layer(&mut self, cycle_period: f64) {
        self.delta = (self.nu() * cycle_period / (2.0 * PI)).sqrt();
    }
}

impl PdeModel for ElasticTube {
    fn density(&self) -> f64 {
        self.rho
    }

    #[inline]
    fn flux_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2] {
        let geo = vessel.geometry(offset);
        let a0 = geo.a0(node);
        let f = geo.f[node];
        [q, q * q / a + f / (3.0 * self.rho) * a.powf(1.5) / a0.sqrt()]
    }

    #[inline]
    fn source_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2] {
        let geo = vessel.geometry(offset);
        let a0 = geo.a0(node);
        let f = geo.f[node];
        let r = (a / PI).sqrt();

        let friction = -2.0 * PI * self.nu() * r * q / (self.delta * a);
        let a15 = a.powf(1.5);
        let taper = (2.0 * PI.sqrt() * f * a15 / (3.0 * a0) - (2.0 / 3.0 * a15 / a0.sqrt() - a) * geo.df_dr0[node])
            / self.rho;

        [0.0, friction + taper * geo.dr0_dx[node]]
    }

    #[inline]
    fn wave_speed_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64 {
        let a0 = vessel.a0(node);
        (0.5 / self.rho * vessel.f_r0()[node] * (a / a0).sqrt()).sqrt()
    }

    #[inline]
    fn elastic_pressure_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64 {
        let a0 = vessel.a0(node);
        vessel.f_r0()[node] * ((a / a0).sqrt() - 1.0)
    }

    fn set_cycle_period(&mut self, total_time: f64, cycles: usize) {
        self.set_boundary_layer(total_time / cycles.max(1) as f64);
    }
}
