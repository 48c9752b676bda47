//! Error types for network solves.

use thiserror::Error;

use crate::types::VesselIndex;

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors that can occur while configuring or running a network solve.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The periodic CFL check failed; the run is aborted.
    #[error(
        "CFL condition violated in vessel {vessel} at time step {step} (dt/dx = {courant:.6e} >= {limit:.6e}); reduce dt"
    )]
    StabilityViolation {
        vessel: VesselIndex,
        step: usize,
        courant: f64,
        limit: f64,
    },

    /// A junction Newton solve exhausted its iteration budget.
    ///
    /// Only raised when strict junction handling is enabled.
    #[error(
        "Junction {junction} did not converge at step {step}: |R| = {residual:.3e} after {iterations} iterations"
    )]
    JunctionNonConvergence {
        junction: String,
        step: usize,
        iterations: usize,
        residual: f64,
    },

    /// The Newton Jacobian could not be factorized.
    #[error("Singular Jacobian matrix")]
    SingularJacobian,

    /// A zero or non-finite pivot appeared during tridiagonal elimination.
    #[error("Singular tridiagonal system: zero pivot at row {row}")]
    SingularTridiagonal { row: usize },

    /// Connectivity sets reference unknown vessels or are otherwise malformed.
    #[error("Invalid connectivity: {0}")]
    InvalidConnectivity(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation was invoked before its prerequisite configuration call.
    #[error("Solver not configured: {0}")]
    NotConfigured(&'static str),

    /// Cross-sectional area became non-positive or non-finite.
    #[error("Non-physical state in vessel {vessel} at step {step}, node {node}: A = {area}")]
    NonPhysicalState {
        vessel: VesselIndex,
        step: usize,
        node: usize,
        area: f64,
    },

    /// A boundary condition needs data the vessel does not carry.
    #[error("Missing boundary data: {0}")]
    MissingBoundaryData(String),

    /// Array lengths do not match.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result archive could not be written or read.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl SolverError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Whether this error aborts a run (as opposed to a recoverable warning).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::JunctionNonConvergence { .. })
    }
}
