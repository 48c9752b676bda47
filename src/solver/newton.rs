//! Newton iteration for the small nonlinear systems that couple vessels at
//! network junctions.
//!
//! Solves R(x) = 0 with the classic multivariate update
//! x_{k+1} = x_k - J(x_k)^{-1} R(x_k), stopping when ||R(x)||_2 < tol or the
//! iteration cap is reached. Hitting the cap is not an error: the best
//! available estimate is returned with `converged = false` so that the caller
//! decides whether to escalate.

use faer::{Mat, linalg::solvers::Solve};

use super::error::{SolverError, SolverResult};

/// Default residual tolerance for junction solves.
pub const DEFAULT_NEWTON_TOLERANCE: f64 = 1e-9;

/// Default iteration cap for junction solves.
pub const DEFAULT_NEWTON_MAX_ITERATIONS: usize = 100;

/// Result of a Newton solve.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonOutcome {
    /// Final iterate (the converged root or the best available estimate)
    pub x: Vec<f64>,
    /// Whether ||R(x)|| dropped below the tolerance
    pub converged: bool,
    /// Number of Newton updates performed
    pub iterations: usize,
    /// L2 norm of the residual at `x`
    pub residual_norm: f64,
}

/// Newton solver with a user-provided residual and analytic Jacobian.
#[derive(Clone, Copy, Debug)]
pub struct NewtonSolver {
    /// Convergence tolerance on the residual L2 norm
    pub tolerance: f64,
    /// Maximum number of Newton updates
    pub max_iterations: usize,
}

impl Default for NewtonSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_NEWTON_TOLERANCE,
            max_iterations: DEFAULT_NEWTON_MAX_ITERATIONS,
        }
    }
}

impl NewtonSolver {
    /// Create a solver with the given tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Solve R(x) = 0 starting from `x0`.
    ///
    /// `jacobian` must return an n×n matrix as rows, where n = `x0.len()`.
    /// Returns [`SolverError::SingularJacobian`] if the linearized system
    /// cannot be solved (the LU solve yields non-finite corrections).
    pub fn solve<R, J>(&self, mut residual: R, mut jacobian: J, x0: &[f64]) -> SolverResult<NewtonOutcome>
    where
        R: FnMut(&[f64]) -> Vec<f64>,
        J: FnMut(&[f64]) -> Vec<Vec<f64>>,
    {
        let n = x0.len();
        let mut x = x0.to_vec();
        let mut r = residual(&x);
        check_len(n, r.len())?;
        let mut norm = l2_norm(&r);
        let mut iterations = 0;

        while norm >= self.tolerance && iterations < self.max_iterations {
            let rows = jacobian(&x);
            check_len(n, rows.len())?;

            let mut jac = Mat::<f64>::zeros(n, n);
            for (i, row) in rows.iter().enumerate() {
                check_len(n, row.len())?;
                for (j, &v) in row.iter().enumerate() {
                    jac[(i, j)] = v;
                }
            }
            let mut rhs = Mat::<f64>::zeros(n, 1);
            for (i, &ri) in r.iter().enumerate() {
                rhs[(i, 0)] = ri;
            }

            let lu = jac.as_ref().full_piv_lu();
            let dx = lu.solve(&rhs);

            for (i, xi) in x.iter_mut().enumerate() {
                let step = dx[(i, 0)];
                if !step.is_finite() {
                    return Err(SolverError::SingularJacobian);
                }
                *xi -= step;
            }
            iterations += 1;

            r = residual(&x);
            check_len(n, r.len())?;
            norm = l2_norm(&r);
        }

        Ok(NewtonOutcome {
            x,
            converged: norm < self.tolerance,
            iterations,
            residual_norm: norm,
        })
    }
}

fn check_len(expected: usize, actual: usize) -> SolverResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SolverError::shape_mismatch(expected, actual))
    }
}

#[inline]
fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|r| r * r).sum::<f64>().sqrt()
}
