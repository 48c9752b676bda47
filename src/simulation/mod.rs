//! Network solve orchestration.
//!
//! This module ties together:
//! - the time grid and solver configuration
//! - the connectivity of vessel ends (inlets, outlets, junctions)
//! - run identity and result caching
//! - reporting hooks and console progress
//! - the [`FdmSolver`] time loop
//!
//! # Example
//! ```ignore
//! use artery_fd::prelude::*;
//!
//! let mut solver = FdmSolver::new(network, ElasticTube::blood(), bcs)
//!     .with_config(SolverConfig::new(Scheme::maccormack_godunov()));
//! solver.configure_time(1e-5, 1.0, 1)?;
//! solver.configure_connectivity(Connectivity::new([0], [1, 2], [[0, 1, 2]], []))?;
//! let outcome = solver.solve("bifurcation", None, 100)?;
//! ```

mod cache;
mod config;
mod connectivity;
mod progress;
mod report;
mod run_id;
mod runner;

pub use cache::{MemoryCache, NoCache, ResultCache};
pub use config::{SolverConfig, TimeGrid};
pub use connectivity::Connectivity;
pub use progress::{NetworkSnapshot, ProgressReporter};
pub use report::{CallbackReporter, Frame, Reporter};
pub use run_id::RunId;
pub use runner::{FdmSolver, JunctionStats, RunStatus, SolveOutcome};
