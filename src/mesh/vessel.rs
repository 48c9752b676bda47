//! Single vessel segment: node placement, radius profile and wall material.
//!
//! A vessel of length L is discretized with N uniformly spaced nodes
//! x_i = i·dx, dx = L/(N-1). The reference (unstressed) radius follows an
//! exponential taper between the proximal and distal radii:
//!
//! r0(x) = r_prox · exp(ln(r_dist/r_prox) · x/L)
//!
//! Geometry and wall stiffness are sampled at the nodes and at both
//! half-node positions x ± dx/2, which the two-step schemes evaluate fluxes
//! and sources at.

use crate::solver::{SolverError, SolverResult};
use crate::types::VesselIndex;

/// Where along the vessel a flux or source is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FaceOffset {
    /// At the nodes x_i
    #[default]
    Node,
    /// At the right half-nodes x_i + dx/2
    PlusHalf,
    /// At the left half-nodes x_i - dx/2
    MinusHalf,
}

/// Empirical wall stiffness law f(r0) = 4/3 · (k1·exp(k2·r0) + k3).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallStiffness {
    /// Stiffness amplitude [Pa]
    pub k1: f64,
    /// Radius decay rate [1/m]
    pub k2: f64,
    /// Asymptotic stiffness [Pa]
    pub k3: f64,
}

impl WallStiffness {
    /// Create a stiffness law.
    pub fn new(k1: f64, k2: f64, k3: f64) -> Self {
        Self { k1, k2, k3 }
    }

    /// f(r0) [Pa].
    #[inline]
    pub fn f(&self, r0: f64) -> f64 {
        4.0 / 3.0 * (self.k1 * (self.k2 * r0).exp() + self.k3)
    }

    /// df/dr0 [Pa/m].
    #[inline]
    pub fn df_dr0(&self, r0: f64) -> f64 {
        4.0 / 3.0 * self.k1 * self.k2 * (self.k2 * r0).exp()
    }
}

impl Default for WallStiffness {
    /// Olufsen's large-artery constants.
    fn default() -> Self {
        Self::new(2.0e6, -2253.0, 8.65e4)
    }
}

/// Three-element Windkessel terminal model attached to an outlet vessel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Windkessel {
    /// Proximal (characteristic) resistance R1
    pub r1: f64,
    /// Distal (peripheral) resistance Rt
    pub rt: f64,
    /// Compliance Ct
    pub ct: f64,
}

impl Windkessel {
    /// Create a Windkessel with resistances `r1`, `rt` and compliance `ct`.
    pub fn new(r1: f64, rt: f64, ct: f64) -> Self {
        Self { r1, rt, ct }
    }
}

/// Geometry and stiffness sampled at one set of positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledGeometry {
    /// Reference radius r0
    pub r0: Vec<f64>,
    /// Spatial derivative dr0/dx
    pub dr0_dx: Vec<f64>,
    /// Stiffness f(r0)
    pub f: Vec<f64>,
    /// Stiffness derivative df/dr0
    pub df_dr0: Vec<f64>,
}

impl SampledGeometry {
    fn sample(positions: impl Iterator<Item = f64>, taper: &Taper, stiffness: &WallStiffness) -> Self {
        let mut out = Self::default();
        for x in positions {
            let r0 = taper.radius(x);
            out.r0.push(r0);
            out.dr0_dx.push(taper.slope(r0));
            out.f.push(stiffness.f(r0));
            out.df_dr0.push(stiffness.df_dr0(r0));
        }
        out
    }

    /// Reference area A0 = π r0² at sample `i`.
    #[inline]
    pub fn a0(&self, i: usize) -> f64 {
        std::f64::consts::PI * self.r0[i] * self.r0[i]
    }
}

#[derive(Clone, Copy, Debug)]
struct Taper {
    r_prox: f64,
    log_ratio: f64,
    length: f64,
}

impl Taper {
    fn radius(&self, x: f64) -> f64 {
        self.r_prox * (self.log_ratio * x / self.length).exp()
    }

    fn slope(&self, r0: f64) -> f64 {
        r0 * self.log_ratio / self.length
    }
}

/// Empirical wall thickness h(r0) = r0·(0.2802·e^{-505.3·r0} + 0.1324·e^{-11.14·r0}).
#[inline]
pub fn wall_thickness(r0: f64) -> f64 {
    r0 * (0.2802 * (-505.3 * r0).exp() + 0.1324 * (-11.14 * r0).exp())
}

/// A vessel segment of the arterial network.
#[derive(Clone, Debug)]
pub struct Vessel {
    index: VesselIndex,
    length: f64,
    r_prox: f64,
    r_dist: f64,
    x: Vec<f64>,
    dx: f64,
    stiffness: WallStiffness,
    nodes: SampledGeometry,
    plus_half: SampledGeometry,
    minus_half: SampledGeometry,
    wall_thickness: Vec<f64>,
    windkessel: Option<Windkessel>,
}

impl Vessel {
    /// Create a tapered vessel with `n_nodes` uniformly spaced nodes.
    pub fn tapered(
        index: VesselIndex,
        length: f64,
        n_nodes: usize,
        r_prox: f64,
        r_dist: f64,
        stiffness: WallStiffness,
    ) -> SolverResult<Self> {
        if n_nodes < 3 {
            return Err(SolverError::InvalidConfig(format!(
                "vessel {index} needs at least 3 nodes, got {n_nodes}"
            )));
        }
        if !(length > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "vessel {index} length must be positive, got {length}"
            )));
        }
        if !(r_prox > 0.0 && r_dist > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "vessel {index} radii must be positive, got ({r_prox}, {r_dist})"
            )));
        }

        let dx = length / (n_nodes - 1) as f64;
        let x: Vec<f64> = (0..n_nodes).map(|i| i as f64 * dx).collect();
        let taper = Taper {
            r_prox,
            log_ratio: (r_dist / r_prox).ln(),
            length,
        };

        let nodes = SampledGeometry::sample(x.iter().copied(), &taper, &stiffness);
        let plus_half = SampledGeometry::sample(x.iter().map(|&xi| xi + 0.5 * dx), &taper, &stiffness);
        let minus_half = SampledGeometry::sample(x.iter().map(|&xi| xi - 0.5 * dx), &taper, &stiffness);
        let wall_thickness = nodes.r0.iter().map(|&r| self::wall_thickness(r)).collect();

        Ok(Self {
            index,
            length,
            r_prox,
            r_dist,
            x,
            dx,
            stiffness,
            nodes,
            plus_half,
            minus_half,
            wall_thickness,
            windkessel: None,
        })
    }

    /// Create a straight (untapered) vessel.
    pub fn uniform(
        index: VesselIndex,
        length: f64,
        n_nodes: usize,
        radius: f64,
        stiffness: WallStiffness,
    ) -> SolverResult<Self> {
        Self::tapered(index, length, n_nodes, radius, radius, stiffness)
    }

    /// Attach a Windkessel terminal model.
    pub fn with_windkessel(mut self, windkessel: Windkessel) -> Self {
        self.windkessel = Some(windkessel);
        self
    }

    /// Position of this vessel in the network.
    #[inline]
    pub fn index(&self) -> VesselIndex {
        self.index
    }

    /// Vessel length L.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Proximal and distal reference radii.
    pub fn radii(&self) -> (f64, f64) {
        (self.r_prox, self.r_dist)
    }

    /// Node positions.
    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Node spacing.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.x.len()
    }

    /// Wall stiffness law.
    pub fn stiffness(&self) -> &WallStiffness {
        &self.stiffness
    }

    /// Geometry sampled at the requested face offset.
    #[inline]
    pub fn geometry(&self, offset: FaceOffset) -> &SampledGeometry {
        match offset {
            FaceOffset::Node => &self.nodes,
            FaceOffset::PlusHalf => &self.plus_half,
            FaceOffset::MinusHalf => &self.minus_half,
        }
    }

    /// Reference radius at the nodes.
    #[inline]
    pub fn r0(&self) -> &[f64] {
        &self.nodes.r0
    }

    /// Reference area A0 = π r0² at node `i`.
    #[inline]
    pub fn a0(&self, i: usize) -> f64 {
        self.nodes.a0(i)
    }

    /// Stiffness f(r0) at the nodes.
    #[inline]
    pub fn f_r0(&self) -> &[f64] {
        &self.nodes.f
    }

    /// Wall thickness at the nodes.
    pub fn wall_thickness(&self) -> &[f64] {
        &self.wall_thickness
    }

    /// Terminal Windkessel, if this vessel is an outlet.
    pub fn windkessel(&self) -> Option<&Windkessel> {
        self.windkessel.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stiffness() -> WallStiffness {
        WallStiffness::new(2.0e6, -2253.0, 8.65e4)
    }

    #[test]
    fn test_uniform_node_placement() {
        let v = Vessel::uniform(VesselIndex::new(0), 0.1, 11, 0.005, stiffness()).unwrap();
        assert_eq!(v.n_nodes(), 11);
        assert_relative_eq!(v.dx(), 0.01, epsilon = 1e-15);
        assert_relative_eq!(v.x()[10], 0.1, epsilon = 1e-15);
        assert!(v.r0().iter().all(|&r| (r - 0.005).abs() < 1e-15));
        assert!(v.geometry(FaceOffset::Node).dr0_dx.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_taper_endpoints_and_half_nodes() {
        let v = Vessel::tapered(VesselIndex::new(1), 0.2, 21, 0.006, 0.004, stiffness()).unwrap();
        let r0 = v.r0();
        assert_relative_eq!(r0[0], 0.006, epsilon = 1e-15);
        assert_relative_eq!(r0[20], 0.004, epsilon = 1e-14);

        // Half-node radii bracket the node radius on a monotone taper.
        let plus = &v.geometry(FaceOffset::PlusHalf).r0;
        let minus = &v.geometry(FaceOffset::MinusHalf).r0;
        for i in 0..21 {
            assert!(minus[i] > r0[i] && r0[i] > plus[i]);
        }

        // dr0/dx = r0 · ln(rd/rp)/L
        let slope = &v.geometry(FaceOffset::Node).dr0_dx;
        assert_relative_eq!(slope[5], r0[5] * (0.004f64 / 0.006).ln() / 0.2, epsilon = 1e-15);
    }

    #[test]
    fn test_stiffness_law() {
        let k = stiffness();
        let r0: f64 = 0.005;
        let expected = 4.0 / 3.0 * (2.0e6 * (-2253.0 * r0).exp() + 8.65e4);
        assert_relative_eq!(k.f(r0), expected, max_relative = 1e-14);

        // Derivative against a central difference.
        let h = 1e-8;
        let fd = (k.f(r0 + h) - k.f(r0 - h)) / (2.0 * h);
        assert_relative_eq!(k.df_dr0(r0), fd, max_relative = 1e-5);
    }

    #[test]
    fn test_wall_thickness_is_a_fraction_of_radius() {
        let h = wall_thickness(0.005);
        assert!(h > 0.0 && h < 0.005);
        let v = Vessel::uniform(VesselIndex::new(0), 0.1, 5, 0.005, stiffness()).unwrap();
        assert_relative_eq!(v.wall_thickness()[2], h);
    }

    #[test]
    fn test_invalid_vessels_rejected() {
        let k = stiffness();
        assert!(Vessel::uniform(VesselIndex::new(0), 0.1, 2, 0.005, k).is_err());
        assert!(Vessel::uniform(VesselIndex::new(0), 0.0, 10, 0.005, k).is_err());
        assert!(Vessel::tapered(VesselIndex::new(0), 0.1, 10, 0.005, -0.001, k).is_err());
    }

    #[test]
    fn test_windkessel_attachment() {
        let v = Vessel::uniform(VesselIndex::new(3), 0.1, 5, 0.005, stiffness())
            .unwrap()
            .with_windkessel(Windkessel::new(5e7, 1e9, 1e-10));
        assert_eq!(v.index(), VesselIndex::new(3));
        assert_eq!(v.windkessel().map(|w| w.r1), Some(5e7));
    }
}
