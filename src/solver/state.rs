//! Per-vessel state: cross-sectional area and volumetric flow rate.
//!
//! A vessel with N nodes carries two rows of N values:
//! - `a` = cross-sectional area A (row 0)
//! - `q` = volumetric flow rate q (row 1)

use ndarray::Array2;

use super::error::{SolverError, SolverResult};

/// State of one vessel at one time level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VesselState {
    /// Cross-sectional area at each node (must remain positive)
    pub a: Vec<f64>,
    /// Volumetric flow rate at each node
    pub q: Vec<f64>,
}

impl VesselState {
    /// Create a state from its two rows.
    pub fn new(a: Vec<f64>, q: Vec<f64>) -> SolverResult<Self> {
        if a.len() != q.len() {
            return Err(SolverError::shape_mismatch(a.len(), q.len()));
        }
        Ok(Self { a, q })
    }

    /// Create a zero state with `n` nodes.
    pub fn zeros(n: usize) -> Self {
        Self {
            a: vec![0.0; n],
            q: vec![0.0; n],
        }
    }

    /// Create a spatially uniform state.
    pub fn uniform(n: usize, a: f64, q: f64) -> Self {
        Self {
            a: vec![a; n],
            q: vec![q; n],
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.a.len()
    }

    /// Index of the last node.
    #[inline]
    pub fn last(&self) -> usize {
        self.a.len().saturating_sub(1)
    }

    /// Get the (A, q) pair at node `i`.
    #[inline]
    pub fn node(&self, i: usize) -> (f64, f64) {
        (self.a[i], self.q[i])
    }

    /// Set the (A, q) pair at node `i`.
    #[inline]
    pub fn set_node(&mut self, i: usize, a: f64, q: f64) {
        self.a[i] = a;
        self.q[i] = q;
    }

    /// Mean velocity q/A at node `i`.
    #[inline]
    pub fn velocity(&self, i: usize) -> f64 {
        self.q[i] / self.a[i]
    }

    /// Both rows, A first.
    #[inline]
    pub fn rows(&self) -> [&[f64]; 2] {
        [&self.a, &self.q]
    }

    /// Both rows mutably, A first.
    #[inline]
    pub fn rows_mut(&mut self) -> [&mut [f64]; 2] {
        [&mut self.a, &mut self.q]
    }

    /// Overwrite this state with another of the same size without reallocating.
    pub fn copy_from(&mut self, other: &VesselState) {
        self.a.clone_from(&other.a);
        self.q.clone_from(&other.q);
    }

    /// Vessel volume by trapezoidal integration of A over uniform spacing `dx`.
    pub fn volume(&self, dx: f64) -> f64 {
        let n = self.a.len();
        if n < 2 {
            return 0.0;
        }
        let interior: f64 = self.a[1..n - 1].iter().sum();
        dx * (interior + 0.5 * (self.a[0] + self.a[n - 1]))
    }

    /// Minimum area over all nodes.
    pub fn min_area(&self) -> f64 {
        self.a.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// First node whose area is non-positive or non-finite.
    pub fn first_nonphysical(&self) -> Option<(usize, f64)> {
        self.a
            .iter()
            .enumerate()
            .find(|&(_, &a)| !(a > 0.0 && a.is_finite()))
            .map(|(i, &a)| (i, a))
    }

    /// Convert to a 2×N array (row 0 = A, row 1 = q).
    pub fn to_array(&self) -> Array2<f64> {
        let n = self.a.len();
        Array2::from_shape_fn((2, n), |(row, i)| if row == 0 { self.a[i] } else { self.q[i] })
    }

    /// Create from a 2×N array (row 0 = A, row 1 = q).
    pub fn from_array(arr: &Array2<f64>) -> SolverResult<Self> {
        if arr.nrows() != 2 {
            return Err(SolverError::shape_mismatch(2, arr.nrows()));
        }
        Ok(Self {
            a: arr.row(0).to_vec(),
            q: arr.row(1).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_state_basic() {
        let state = VesselState::new(vec![1.0, 2.0, 3.0], vec![0.5, 0.0, -1.5]).unwrap();
        assert_eq!(state.n_nodes(), 3);
        assert_eq!(state.last(), 2);
        assert_eq!(state.node(2), (3.0, -1.5));
        assert_relative_eq!(state.velocity(0), 0.5);
        assert_relative_eq!(state.velocity(2), -0.5);
    }

    #[test]
    fn test_state_rows_must_match() {
        let result = VesselState::new(vec![1.0, 2.0], vec![0.0]);
        assert!(matches!(result, Err(SolverError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_volume_trapezoid() {
        // Linear area profile integrates exactly.
        let a: Vec<f64> = (0..11).map(|i| 1.0 + 0.1 * i as f64).collect();
        let state = VesselState::new(a, vec![0.0; 11]).unwrap();
        assert_relative_eq!(state.volume(0.1), 1.5, epsilon = 1e-12);
        assert_eq!(VesselState::zeros(1).volume(0.1), 0.0);
    }

    #[test]
    fn test_nonphysical_detection() {
        let mut state = VesselState::uniform(5, 1e-5, 0.0);
        assert!(state.first_nonphysical().is_none());
        assert_relative_eq!(state.min_area(), 1e-5);

        state.a[3] = -1e-9;
        assert_eq!(state.first_nonphysical(), Some((3, -1e-9)));

        state.a[1] = f64::NAN;
        assert_eq!(state.first_nonphysical().map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_array_conversion() {
        let state = VesselState::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let arr = state.to_array();
        assert_eq!(arr.shape(), &[2, 2]);
        assert_eq!(arr[[1, 0]], 3.0);
        assert_eq!(VesselState::from_array(&arr).unwrap(), state);
    }

    #[test]
    fn test_copy_from() {
        let src = VesselState::uniform(4, 2.0, 1.0);
        let mut dst = VesselState::zeros(4);
        dst.copy_from(&src);
        assert_eq!(dst, src);
    }
}
