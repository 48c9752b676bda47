//! Run-identity caches.
//!
//! The solver only needs to ask whether a run already produced a result and
//! to mark a finished run. [`MemoryCache`] keeps identities for the lifetime
//! of one solver; `io::ArchiveCache` checks for archives on disk.

use std::collections::HashSet;

use crate::solver::SolverResult;

use super::run_id::RunId;

/// Existence predicate and write hook keyed by [`RunId`].
pub trait ResultCache: Send {
    /// Whether a result for `id` already exists.
    fn contains(&self, id: &RunId) -> bool;

    /// Record that `id` completed.
    fn commit(&mut self, id: &RunId) -> SolverResult<()>;
}

/// Cache that never hits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn contains(&self, _id: &RunId) -> bool {
        false
    }

    fn commit(&mut self, _id: &RunId) -> SolverResult<()> {
        Ok(())
    }
}

/// In-process cache of completed run identities.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    completed: HashSet<RunId>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

impl ResultCache for MemoryCache {
    fn contains(&self, id: &RunId) -> bool {
        self.completed.contains(id)
    }

    fn commit(&mut self, id: &RunId) -> SolverResult<()> {
        self.completed.insert(id.clone());
        Ok(())
    }
}
