//! Thomas algorithm for tridiagonal systems.
//!
//! Used by the Godunov-split viscous correction, which couples the flow rate
//! of neighbouring interior nodes through a banded implicit operator.

use super::error::{SolverError, SolverResult};

/// Solve the tridiagonal system `A x = d` using the Thomas algorithm.
///
/// - `lower`: sub-diagonal \[n-1\] (`lower[i]` couples row i+1 to column i)
/// - `diag`: main diagonal \[n\]
/// - `upper`: super-diagonal \[n-1\] (`upper[i]` couples row i to column i+1)
/// - `rhs`: right-hand side \[n\]
///
/// No pivoting is performed. A zero or non-finite pivot is reported as
/// [`SolverError::SingularTridiagonal`]; an ill-conditioned but non-singular
/// band still produces whatever elimination yields.
pub fn thomas_solve(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> SolverResult<Vec<f64>> {
    let mut x = vec![0.0; rhs.len()];
    thomas_solve_into(lower, diag, upper, rhs, &mut x)?;
    Ok(x)
}

/// Solve the tridiagonal system into a caller-provided buffer.
///
/// See [`thomas_solve`] for the band layout.
pub fn thomas_solve_into(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
    x: &mut [f64],
) -> SolverResult<()> {
    let n = diag.len();
    if n == 0 {
        return Err(SolverError::InvalidConfig("tridiagonal system of size 0".into()));
    }
    if rhs.len() != n {
        return Err(SolverError::shape_mismatch(n, rhs.len()));
    }
    if x.len() != n {
        return Err(SolverError::shape_mismatch(n, x.len()));
    }
    if lower.len() != n - 1 {
        return Err(SolverError::shape_mismatch(n - 1, lower.len()));
    }
    if upper.len() != n - 1 {
        return Err(SolverError::shape_mismatch(n - 1, upper.len()));
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    // Forward sweep
    let pivot = checked_pivot(diag[0], 0)?;
    if n > 1 {
        c_prime[0] = upper[0] / pivot;
    }
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        let den = checked_pivot(diag[i] - lower[i - 1] * c_prime[i - 1], i)?;
        if i < n - 1 {
            c_prime[i] = upper[i] / den;
        }
        d_prime[i] = (rhs[i] - lower[i - 1] * d_prime[i - 1]) / den;
    }

    // Back substitution
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(())
}

fn checked_pivot(value: f64, row: usize) -> SolverResult<f64> {
    if value == 0.0 || !value.is_finite() {
        Err(SolverError::SingularTridiagonal { row })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiply(lower: &[f64], diag: &[f64], upper: &[f64], x: &[f64]) -> Vec<f64> {
        let n = diag.len();
        (0..n)
            .map(|i| {
                let mut v = diag[i] * x[i];
                if i > 0 {
                    v += lower[i - 1] * x[i - 1];
                }
                if i < n - 1 {
                    v += upper[i] * x[i + 1];
                }
                v
            })
            .collect()
    }

    #[test]
    fn test_thomas_identity() {
        let d = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let x = thomas_solve(&[0.0; 4], &[1.0; 5], &[0.0; 4], &d).unwrap();
        for i in 0..5 {
            assert!((x[i] - d[i]).abs() < 1e-12, "x[{i}] should equal d[{i}]");
        }
    }

    #[test]
    fn test_thomas_known_solution() {
        // 1D Laplacian [-1, 2, -1] with exact solution x_i = i + 1.
        let n = 6;
        let lower = vec![-1.0; n - 1];
        let diag = vec![2.0; n];
        let upper = vec![-1.0; n - 1];
        let exact: Vec<f64> = (0..n).map(|i| i as f64 + 1.0).collect();
        let rhs = multiply(&lower, &diag, &upper, &exact);

        let x = thomas_solve(&lower, &diag, &upper, &rhs).unwrap();
        for i in 0..n {
            assert!(
                (x[i] - exact[i]).abs() < 1e-10,
                "x[{i}] = {}, expected {}",
                x[i],
                exact[i]
            );
        }
    }

    #[test]
    fn test_thomas_closed_form_rhs() {
        // For [-1, 2, -1] with rhs = e_0 + e_{n-1}, the solution is all ones.
        let n = 8;
        let mut rhs = vec![0.0; n];
        rhs[0] = 1.0;
        rhs[n - 1] = 1.0;
        let x = thomas_solve(&vec![-1.0; n - 1], &vec![2.0; n], &vec![-1.0; n - 1], &rhs).unwrap();
        for (i, xi) in x.iter().enumerate() {
            assert!((xi - 1.0).abs() < 1e-10, "x[{i}] = {xi}");
        }
    }

    #[test]
    fn test_thomas_single_row() {
        let x = thomas_solve(&[], &[4.0], &[], &[2.0]).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_thomas_zero_pivot() {
        let result = thomas_solve(&[1.0], &[0.0, 1.0], &[1.0], &[1.0, 1.0]);
        assert!(matches!(result, Err(SolverError::SingularTridiagonal { row: 0 })));

        // [[1, 1], [1, 1]] eliminates to a zero pivot in row 1.
        let result = thomas_solve(&[1.0], &[1.0, 1.0], &[1.0], &[1.0, 1.0]);
        assert!(matches!(result, Err(SolverError::SingularTridiagonal { row: 1 })));
    }

    #[test]
    fn test_thomas_shape_mismatch() {
        let result = thomas_solve(&[1.0, 1.0], &[2.0, 2.0], &[1.0], &[1.0, 1.0]);
        assert!(matches!(result, Err(SolverError::ShapeMismatch { .. })));
    }
}
