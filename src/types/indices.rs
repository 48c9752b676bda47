//! Vessel identity.
//!
//! A vessel is identified by its position in the network's vessel list.
//! The newtype keeps vessel identities apart from node indices and step
//! counters, which are plain `usize` throughout the solver.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Vessel index in a network.
///
/// # Example
///
/// ```
/// use artery_fd::types::VesselIndex;
///
/// let v = VesselIndex::new(3);
/// assert_eq!(v.get(), 3);
/// assert_eq!(v.to_string(), "V3");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VesselIndex(usize);

impl VesselIndex {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the vessel list.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Indices of a network with `n` vessels.
    pub fn all(n: usize) -> impl ExactSizeIterator<Item = VesselIndex> {
        (0..n).map(Self)
    }
}

impl fmt::Display for VesselIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

impl From<usize> for VesselIndex {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<VesselIndex> for usize {
    #[inline]
    fn from(idx: VesselIndex) -> usize {
        idx.0
    }
}

// Per-vessel buffers (states, workspaces, vessels) are indexed directly.
impl<T> Index<VesselIndex> for [T] {
    type Output = T;
    #[inline]
    fn index(&self, idx: VesselIndex) -> &T {
        &self[idx.0]
    }
}

impl<T> IndexMut<VesselIndex> for [T] {
    #[inline]
    fn index_mut(&mut self, idx: VesselIndex) -> &mut T {
        &mut self[idx.0]
    }
}

impl<T> Index<VesselIndex> for Vec<T> {
    type Output = T;
    #[inline]
    fn index(&self, idx: VesselIndex) -> &T {
        &self[idx.0]
    }
}

impl<T> IndexMut<VesselIndex> for Vec<T> {
    #[inline]
    fn index_mut(&mut self, idx: VesselIndex) -> &mut T {
        &mut self[idx.0]
    }
}
