//! Ordered collection of vessels forming an arterial tree.

use crate::solver::{SolverError, SolverResult};
use crate::types::VesselIndex;

use super::vessel::Vessel;

/// Vessel network. A vessel's identity is its position in the list.
#[derive(Clone, Debug)]
pub struct VesselNetwork {
    vessels: Vec<Vessel>,
}

impl VesselNetwork {
    /// Create a network, checking that each vessel's index matches its position.
    pub fn new(vessels: Vec<Vessel>) -> SolverResult<Self> {
        if vessels.is_empty() {
            return Err(SolverError::InvalidConfig("network has no vessels".into()));
        }
        for (pos, v) in vessels.iter().enumerate() {
            if v.index().get() != pos {
                return Err(SolverError::InvalidConfig(format!(
                    "vessel {} stored at position {pos}",
                    v.index()
                )));
            }
        }
        Ok(Self { vessels })
    }

    /// Number of vessels.
    #[inline]
    pub fn n_vessels(&self) -> usize {
        self.vessels.len()
    }

    /// All vessels in index order.
    #[inline]
    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Vessel by index, if present.
    pub fn get(&self, idx: VesselIndex) -> Option<&Vessel> {
        self.vessels.get(idx.get())
    }

    /// Vessel by index, with a named error when absent.
    pub fn vessel(&self, idx: VesselIndex) -> SolverResult<&Vessel> {
        self.get(idx)
            .ok_or_else(|| SolverError::InvalidConnectivity(format!("unknown vessel {idx}")))
    }

    /// Whether `idx` refers to a vessel of this network.
    pub fn contains(&self, idx: VesselIndex) -> bool {
        idx.get() < self.vessels.len()
    }

    /// Total number of nodes over all vessels.
    pub fn total_nodes(&self) -> usize {
        self.vessels.iter().map(Vessel::n_nodes).sum()
    }

    /// Smallest node spacing in the network.
    pub fn min_dx(&self) -> f64 {
        self.vessels.iter().map(Vessel::dx).fold(f64::INFINITY, f64::min)
    }
}
