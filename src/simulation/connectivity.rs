//! Network connectivity: which vessel ends carry which condition.

use crate::mesh::VesselNetwork;
use crate::solver::{SolverError, SolverResult};
use crate::types::VesselIndex;

/// The four connectivity sets of a network, as vessel indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connectivity {
    /// Vessels whose first node carries the inlet condition
    pub inlets: Vec<VesselIndex>,
    /// Vessels whose last node carries the outlet condition
    pub outlets: Vec<VesselIndex>,
    /// (parent, daughter 1, daughter 2)
    pub bifurcations: Vec<[VesselIndex; 3]>,
    /// (upstream, downstream)
    pub conjunctions: Vec<[VesselIndex; 2]>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum End {
    First,
    Last,
}

impl Connectivity {
    /// Build from raw indices.
    pub fn new(
        inlets: impl IntoIterator<Item = usize>,
        outlets: impl IntoIterator<Item = usize>,
        bifurcations: impl IntoIterator<Item = [usize; 3]>,
        conjunctions: impl IntoIterator<Item = [usize; 2]>,
    ) -> Self {
        Self {
            inlets: inlets.into_iter().map(VesselIndex::new).collect(),
            outlets: outlets.into_iter().map(VesselIndex::new).collect(),
            bifurcations: bifurcations.into_iter().map(|t| t.map(VesselIndex::new)).collect(),
            conjunctions: conjunctions.into_iter().map(|p| p.map(VesselIndex::new)).collect(),
        }
    }

    /// Single vessel with an inlet and an outlet.
    pub fn single(vessel: usize) -> Self {
        Self::new([vessel], [vessel], [], [])
    }

    /// Number of junctions of either kind.
    pub fn n_junctions(&self) -> usize {
        self.bifurcations.len() + self.conjunctions.len()
    }

    /// Check the sets against a network.
    ///
    /// Every index must exist, junction members must be distinct, and each
    /// vessel end may be written by at most one condition.
    pub fn validate(&self, network: &VesselNetwork) -> SolverResult<()> {
        let n = network.n_vessels();
        let mut first: Vec<Option<&'static str>> = vec![None; n];
        let mut last: Vec<Option<&'static str>> = vec![None; n];

        let mut claim = |idx: VesselIndex, end: End, role: &'static str| -> SolverResult<()> {
            if !network.contains(idx) {
                return Err(SolverError::InvalidConnectivity(format!(
                    "{role} references vessel {idx} but the network has {n} vessels"
                )));
            }
            let slot = match end {
                End::First => &mut first[idx.get()],
                End::Last => &mut last[idx.get()],
            };
            if let Some(existing) = slot {
                let which = if end == End::First { "first" } else { "last" };
                return Err(SolverError::InvalidConnectivity(format!(
                    "{which} node of vessel {idx} is claimed by both {existing} and {role}"
                )));
            }
            *slot = Some(role);
            Ok(())
        };

        for &v in &self.inlets {
            claim(v, End::First, "inlet")?;
        }
        for &v in &self.outlets {
            claim(v, End::Last, "outlet")?;
        }
        for &[p, d1, d2] in &self.bifurcations {
            if p == d1 || p == d2 || d1 == d2 {
                return Err(SolverError::InvalidConnectivity(format!(
                    "bifurcation ({p}, {d1}, {d2}) repeats a vessel"
                )));
            }
            claim(p, End::Last, "bifurcation parent")?;
            claim(d1, End::First, "bifurcation daughter")?;
            claim(d2, End::First, "bifurcation daughter")?;
        }
        for &[a, b] in &self.conjunctions {
            if a == b {
                return Err(SolverError::InvalidConnectivity(format!("conjunction ({a}, {b}) joins a vessel to itself")));
            }
            claim(a, End::Last, "conjunction upstream")?;
            claim(b, End::First, "conjunction downstream")?;
        }
        Ok(())
    }
}
