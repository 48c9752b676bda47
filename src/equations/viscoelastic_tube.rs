//! Viscoelastic tube law.
//!
//! Adds a Voigt-type wall viscosity to [`ElasticTube`]:
//!
//! p = f(r0)·(√(A/A0) − 1) − Cv · ∂q/∂x,  Cv = ⅔ √π φ h / (A0 √A)
//!
//! The hyperbolic part (flux, source, wave speed) is that of the elastic
//! model; the viscous term enters through the split diffusive step via
//! [`PdeModel::compliance`].

use std::f64::consts::PI;

use crate::mesh::{FaceOffset, Vessel};
use crate::solver::VesselState;

use super::{ElasticTube, PdeModel};

/// Viscoelastic tube model.
#[derive(Clone, Copy, Debug)]
pub struct ViscoelasticTube {
    /// Underlying elastic model
    pub elastic: ElasticTube,
    /// Wall viscosity φ [Pa·s]
    pub phi: f64,
}

impl ViscoelasticTube {
    /// Create a viscoelastic model from an elastic one and wall viscosity `phi`.
    pub fn new(elastic: ElasticTube, phi: f64) -> Self {
        Self { elastic, phi }
    }

    /// Viscous compliance Cv at one node.
    #[inline]
    pub fn viscous_compliance_at(&self, a: f64, wall_thickness: f64, node: usize, vessel: &Vessel) -> f64 {
        2.0 / 3.0 * PI.sqrt() * self.phi * wall_thickness / (vessel.a0(node) * a.sqrt())
    }
}

impl PdeModel for ViscoelasticTube {
    fn density(&self) -> f64 {
        self.elastic.rho
    }

    #[inline]
    fn flux_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2] {
        self.elastic.flux_at(a, q, node, offset, vessel)
    }

    #[inline]
    fn source_at(&self, a: f64, q: f64, node: usize, offset: FaceOffset, vessel: &Vessel) -> [f64; 2] {
        self.elastic.source_at(a, q, node, offset, vessel)
    }

    #[inline]
    fn wave_speed_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64 {
        self.elastic.wave_speed_at(a, node, vessel)
    }

    #[inline]
    fn elastic_pressure_at(&self, a: f64, node: usize, vessel: &Vessel) -> f64 {
        self.elastic.elastic_pressure_at(a, node, vessel)
    }

    fn pressure(&self, u: &VesselState, vessel: &Vessel) -> Vec<f64> {
        let cv = self.compliance(&u.a, vessel.wall_thickness(), vessel);
        let dq_dx = gradient(&u.q, vessel.dx());
        (0..u.n_nodes())
            .map(|i| self.elastic_pressure_at(u.a[i], i, vessel) - cv[i] * dq_dx[i])
            .collect()
    }

    fn compliance(&self, a: &[f64], wall_thickness: &[f64], vessel: &Vessel) -> Vec<f64> {
        a.iter()
            .zip(wall_thickness)
            .enumerate()
            .map(|(i, (&ai, &h))| self.viscous_compliance_at(ai, h, i, vessel))
            .collect()
    }

    fn set_cycle_period(&mut self, total_time: f64, cycles: usize) {
        self.elastic.set_cycle_period(total_time, cycles);
    }
}

/// Second-order central differences inside, first-order one-sided at the ends.
fn gradient(values: &[f64], dx: f64) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / dx;
    out[n - 1] = (values[n - 1] - values[n - 2]) / dx;
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / (2.0 * dx);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::WallStiffness;
    use crate::types::VesselIndex;
    use approx::assert_relative_eq;

    fn vessel() -> Vessel {
        Vessel::uniform(VesselIndex::new(0), 0.1, 11, 0.005, WallStiffness::new(2e6, -2253.0, 8.65e4)).unwrap()
    }

    #[test]
    fn test_gradient_linear_exact() {
        let values: Vec<f64> = (0..6).map(|i| 3.0 * i as f64 * 0.5).collect();
        let g = gradient(&values, 0.5);
        for gi in g {
            assert_relative_eq!(gi, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_uniform_flow_has_elastic_pressure() {
        let model = ViscoelasticTube::new(ElasticTube::blood(), 2500.0);
        let v = vessel();
        let u = VesselState::uniform(11, 1.02 * v.a0(0), 1e-6);
        let p = model.pressure(&u, &v);
        let p_el = model.elastic_pressure_at(u.a[4], 4, &v);
        assert_relative_eq!(p[4], p_el, max_relative = 1e-14);
    }

    #[test]
    fn test_viscous_term_opposes_flow_gradient() {
        let model = ViscoelasticTube::new(ElasticTube::blood(), 2500.0);
        let v = vessel();
        let mut u = VesselState::uniform(11, v.a0(0), 0.0);
        for i in 0..11 {
            u.q[i] = 1e-6 * i as f64;
        }
        let p = model.pressure(&u, &v);
        // At reference area the elastic part vanishes; increasing q gives p < 0.
        assert!(p.iter().all(|&pi| pi < 0.0));
    }

    #[test]
    fn test_compliance_positive_and_elastic_has_none() {
        let model = ViscoelasticTube::new(ElasticTube::blood(), 2500.0);
        let v = vessel();
        let a = vec![v.a0(0); 11];
        let cv = model.compliance(&a, v.wall_thickness(), &v);
        assert!(cv.iter().all(|&c| c > 0.0));

        let elastic = ElasticTube::blood();
        assert!(elastic.compliance(&a, v.wall_thickness(), &v).iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_cycle_period_forwarded() {
        let mut model = ViscoelasticTube::new(ElasticTube::blood(), 2500.0);
        let before = model.elastic.delta();
        model.set_cycle_period(4.0, 1);
        assert!(model.elastic.delta() > before);
    }
}
