//! Solver configuration and time grid.

use crate::solver::{DEFAULT_NEWTON_MAX_ITERATIONS, DEFAULT_NEWTON_TOLERANCE, Scheme, SolverError, SolverResult};

// =============================================================================
// Solver Configuration
// =============================================================================

/// Configuration of a network solve.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Advance scheme.
    pub scheme: Scheme,
    /// Residual tolerance of junction Newton solves.
    pub newton_tolerance: f64,
    /// Iteration cap of junction Newton solves.
    pub newton_max_iterations: usize,
    /// Abort the run when a junction solve does not converge.
    pub strict_junctions: bool,
    /// Abort the run when an area becomes non-positive or non-finite.
    pub check_positive_area: bool,
    /// Print a progress line to stdout.
    pub verbose: bool,
    /// Print flag handed to reporters with each frame.
    pub print_frames: bool,
    /// Persist flag handed to reporters with each frame.
    pub persist_frames: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            newton_tolerance: DEFAULT_NEWTON_TOLERANCE,
            newton_max_iterations: DEFAULT_NEWTON_MAX_ITERATIONS,
            strict_junctions: false,
            check_positive_area: true,
            verbose: false,
            print_frames: false,
            persist_frames: true,
        }
    }
}

impl SolverConfig {
    /// Default configuration with the given scheme.
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    /// Set the advance scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the junction Newton tolerance and iteration cap.
    pub fn with_newton(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.newton_tolerance = tolerance;
        self.newton_max_iterations = max_iterations;
        self
    }

    /// Treat junction non-convergence as a fatal error.
    pub fn with_strict_junctions(mut self, strict: bool) -> Self {
        self.strict_junctions = strict;
        self
    }

    /// Enable or disable the positive-area check.
    pub fn with_area_check(mut self, check: bool) -> Self {
        self.check_positive_area = check;
        self
    }

    /// Set the print and persist flags handed to reporters.
    pub fn with_frame_flags(mut self, print: bool, persist: bool) -> Self {
        self.print_frames = print;
        self.persist_frames = persist;
        self
    }

    /// Enable progress output.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.newton_tolerance > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "newton_tolerance must be positive, got {}",
                self.newton_tolerance
            )));
        }
        if self.newton_max_iterations == 0 {
            return Err(SolverError::InvalidConfig("newton_max_iterations must be at least 1".into()));
        }
        if let Scheme::MacCormackGodunov { theta } = self.scheme {
            if !(0.0..=1.0).contains(&theta) {
                return Err(SolverError::InvalidConfig(format!(
                    "split-step theta must lie in [0, 1], got {theta}"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Time Grid
// =============================================================================

/// Uniform time grid t_k = k·Δt, k = 0..=Nt, with Nt = round(T/Δt).
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    dt: f64,
    total_time: f64,
    cycles: usize,
    times: Vec<f64>,
}

impl TimeGrid {
    /// Build the grid for step `dt`, total period `total_time` and `cycles` cycles.
    pub fn new(dt: f64, total_time: f64, cycles: usize) -> SolverResult<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SolverError::InvalidConfig(format!("dt must be positive, got {dt}")));
        }
        if !(total_time > 0.0 && total_time.is_finite()) {
            return Err(SolverError::InvalidConfig(format!(
                "total time must be positive, got {total_time}"
            )));
        }
        if cycles == 0 {
            return Err(SolverError::InvalidConfig("number of cycles must be at least 1".into()));
        }
        // T shorter than half a step gives an empty loop over t_0 alone.
        let n_steps = (total_time / dt).round() as usize;

        let end = n_steps as f64 * dt;
        let step = if n_steps == 0 { dt } else { end / n_steps as f64 };
        let mut times: Vec<f64> = (0..=n_steps).map(|k| k as f64 * step).collect();
        times[n_steps] = end;

        Ok(Self {
            dt,
            total_time,
            cycles,
            times,
        })
    }

    /// Time step Δt.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Total simulated period T.
    #[inline]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of cycles in T.
    #[inline]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of steps Nt.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.times.len() - 1
    }

    /// All time instants t_0..=t_Nt.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Time at step `n`.
    #[inline]
    pub fn time(&self, n: usize) -> f64 {
        self.times[n]
    }
}
