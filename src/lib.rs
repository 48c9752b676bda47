//! # artery-fd
//!
//! Explicit finite-difference solver for pulse-wave propagation in networks
//! of elastic tubes.
//!
//! Each vessel carries the 1-D conservation laws for cross-sectional area A
//! and volumetric flow rate q:
//!
//! ```text
//! ∂A/∂t + ∂q/∂x = 0
//! ∂q/∂t + ∂(q²/A + B)/∂x = S
//! ```
//!
//! This crate provides:
//! - Vessel geometry (tapered radius, wall stiffness, Windkessel terminals)
//! - Tube laws (elastic and viscoelastic)
//! - Advance schemes (Lax-Wendroff, MacCormack, MacCormack with a Godunov
//!   split viscous step)
//! - Inlet, outlet and junction coupling conditions
//! - Newton and tridiagonal solvers for junctions and the split step
//! - A time loop with a strict CFL gate, run-identity caching and `.npz` archives

pub mod boundary;
pub mod equations;
pub mod io;
pub mod mesh;
pub mod simulation;
pub mod solver;
pub mod types;

// Re-export main types for convenience
pub use boundary::{ArterialBoundaries, BoundaryConditions, BoundaryContext, Inlet};
pub use equations::{ElasticTube, FaceOffset, PdeModel, ViscoelasticTube};
pub use io::{Archive, ArchiveCache, ArchiveRecorder};
pub use mesh::{Vessel, VesselNetwork, WallStiffness, Windkessel};
pub use simulation::{
    CallbackReporter, Connectivity, FdmSolver, Frame, JunctionStats, MemoryCache, NoCache, Reporter,
    ResultCache, RunId, RunStatus, SolveOutcome, SolverConfig, TimeGrid,
};
pub use solver::{NewtonOutcome, NewtonSolver, Scheme, SolverError, SolverResult, VesselState};
pub use types::VesselIndex;

/// Everything needed to set up and run a network solve.
pub mod prelude {
    pub use crate::boundary::{ArterialBoundaries, BoundaryConditions, Inlet};
    pub use crate::equations::{ElasticTube, PdeModel, ViscoelasticTube};
    pub use crate::io::{ArchiveCache, ArchiveRecorder};
    pub use crate::mesh::{Vessel, VesselNetwork, WallStiffness, Windkessel};
    pub use crate::simulation::{
        CallbackReporter, Connectivity, FdmSolver, Frame, Reporter, RunStatus, SolveOutcome, SolverConfig,
    };
    pub use crate::solver::{Scheme, SolverError, SolverResult, VesselState};
    pub use crate::types::VesselIndex;
}
