//! Numerical core of the network solver.
//!
//! # Submodules
//!
//! - [`state`]: per-vessel (A, q) state
//! - [`schemes`]: Lax-Wendroff, MacCormack and MacCormack-Godunov advance operators
//! - [`cfl`]: strict CFL stability gate
//! - [`newton`]: Newton iteration for junction coupling
//! - [`tridiag`]: Thomas algorithm for the split diffusive step
//! - [`error`]: error type shared by the whole crate

pub mod cfl;
pub mod error;
pub mod newton;
pub mod schemes;
pub mod state;
pub mod tridiag;

pub use cfl::{cfl_condition, cfl_ok, courant_limit, courant_numbers};
pub use error::{SolverError, SolverResult};
pub use newton::{DEFAULT_NEWTON_MAX_ITERATIONS, DEFAULT_NEWTON_TOLERANCE, NewtonOutcome, NewtonSolver};
pub use schemes::{Scheme, SchemeWorkspace};
pub use state::VesselState;
pub use tridiag::{thomas_solve, thomas_solve_into};
