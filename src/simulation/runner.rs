//! Time loop over a vessel network.
//!
//! One step of [`FdmSolver::solve`]:
//!
//! 1. advance every vessel with the selected scheme (parallel with the
//!    `parallel` feature)
//! 2. inlet, then outlet conditions on the fresh states
//! 3. Newton solve of every bifurcation, then every conjunction
//! 4. per vessel: split step into the commit buffer, area check, and on the
//!    `skip_frames` cadence the CFL gate on the pre-split state followed by
//!    a report of the committed state
//! 5. commit
//!
//! Steps 2-5 are serial and start only after every vessel has advanced.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::boundary::{BoundaryConditions, BoundaryContext};
use crate::equations::PdeModel;
use crate::mesh::VesselNetwork;
use crate::solver::{NewtonSolver, SchemeWorkspace, SolverError, SolverResult, VesselState, courant_numbers};
use crate::types::VesselIndex;

use super::cache::{MemoryCache, ResultCache};
use super::config::{SolverConfig, TimeGrid};
use super::connectivity::Connectivity;
use super::progress::{NetworkSnapshot, ProgressReporter};
use super::report::{Frame, Reporter};
use super::run_id::RunId;

// =============================================================================
// Outcome types
// =============================================================================

/// How a solve ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Every step was computed
    Completed,
    /// A result for the same run identity already existed; nothing was computed
    Cached,
}

/// Junction solve statistics of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JunctionStats {
    /// Number of Newton solves
    pub solves: usize,
    /// Solves that hit the iteration cap
    pub non_converged: usize,
    /// Largest iteration count of a single solve
    pub max_iterations: usize,
    /// Largest final residual norm of a single solve
    pub worst_residual: f64,
}

impl JunctionStats {
    fn record(&mut self, iterations: usize, residual: f64, converged: bool) {
        self.solves += 1;
        self.max_iterations = self.max_iterations.max(iterations);
        self.worst_residual = self.worst_residual.max(residual);
        if !converged {
            self.non_converged += 1;
        }
    }
}

/// Result of [`FdmSolver::solve`].
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: RunStatus,
    pub run_id: RunId,
    /// Number of computed time steps
    pub steps: usize,
    pub junctions: JunctionStats,
    /// Committed state of every vessel at the final time (empty when cached)
    pub final_states: Vec<VesselState>,
    /// ∫A dx per vessel at the final time (empty when cached)
    pub volumes: Vec<f64>,
    pub wall_time: Duration,
}

impl SolveOutcome {
    fn cached(run_id: RunId) -> Self {
        Self {
            status: RunStatus::Cached,
            run_id,
            steps: 0,
            junctions: JunctionStats::default(),
            final_states: Vec::new(),
            volumes: Vec::new(),
            wall_time: Duration::ZERO,
        }
    }

    /// Whether the run was computed rather than served from the cache.
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

// =============================================================================
// Junctions
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum Junction {
    Bifurcation([VesselIndex; 3]),
    Conjunction([VesselIndex; 2]),
}

impl Junction {
    fn members(&self) -> &[VesselIndex] {
        match self {
            Self::Bifurcation(m) => m,
            Self::Conjunction(m) => m,
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bifurcation([p, d1, d2]) => write!(f, "bifurcation ({p}, {d1}, {d2})"),
            Self::Conjunction([a, b]) => write!(f, "conjunction ({a}, {b})"),
        }
    }
}

/// Coupled node and neighbouring interior node of junction member `k`.
///
/// Member 0 enters the junction with its last node; the rest leave it with
/// their first node.
fn junction_nodes(k: usize, n_nodes: usize) -> (usize, usize) {
    if k == 0 { (n_nodes - 1, n_nodes - 2) } else { (0, 1) }
}

// =============================================================================
// Per-run buffers
// =============================================================================

struct RunContext {
    /// Known level n
    prev: Vec<VesselState>,
    /// Candidate level n+1 (pre-split)
    next: Vec<VesselState>,
    /// Level n+1 as committed (post-split)
    committed: Vec<VesselState>,
    workspaces: Vec<SchemeWorkspace>,
    junctions: JunctionStats,
}

impl RunContext {
    fn new(initial: Vec<VesselState>) -> Self {
        let next = initial.clone();
        let committed = initial.clone();
        let workspaces = initial.iter().map(|s| SchemeWorkspace::new(s.n_nodes())).collect();
        Self {
            prev: initial,
            next,
            committed,
            workspaces,
            junctions: JunctionStats::default(),
        }
    }

    fn commit(&mut self) {
        std::mem::swap(&mut self.prev, &mut self.committed);
    }

    fn snapshot(&self, network: &VesselNetwork) -> NetworkSnapshot {
        let total_volume = self
            .prev
            .iter()
            .zip(network.vessels())
            .map(|(s, v)| s.volume(v.dx()))
            .sum();
        let min_area = self.prev.iter().map(VesselState::min_area).fold(f64::INFINITY, f64::min);
        NetworkSnapshot {
            total_volume,
            min_area,
            non_converged: self.junctions.non_converged,
        }
    }
}

// =============================================================================
// Solver
// =============================================================================

/// Explicit finite-difference solver for a vessel network.
///
/// # Example
/// ```ignore
/// let mut solver = FdmSolver::new(network, ElasticTube::blood(), bcs)
///     .with_config(SolverConfig::new(Scheme::MacCormack));
/// solver.configure_time(1e-5, 0.8, 1)?;
/// solver.configure_connectivity(Connectivity::new([0], [1, 2], [[0, 1, 2]], []))?;
/// let outcome = solver.solve("aorta", Some(&mut recorder), 50)?;
/// ```
pub struct FdmSolver<P: PdeModel, B: BoundaryConditions<P>> {
    network: VesselNetwork,
    model: P,
    bcs: B,
    config: SolverConfig,
    time: Option<TimeGrid>,
    connectivity: Option<Connectivity>,
    cache: Box<dyn ResultCache>,
}

impl<P: PdeModel, B: BoundaryConditions<P>> FdmSolver<P, B> {
    /// Solver with the default configuration and an in-memory run cache.
    pub fn new(network: VesselNetwork, model: P, bcs: B) -> Self {
        Self {
            network,
            model,
            bcs,
            config: SolverConfig::default(),
            time: None,
            connectivity: None,
            cache: Box::new(MemoryCache::new()),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the run-identity cache.
    pub fn with_cache(mut self, cache: impl ResultCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    pub fn network(&self) -> &VesselNetwork {
        &self.network
    }

    pub fn model(&self) -> &P {
        &self.model
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn time_grid(&self) -> Option<&TimeGrid> {
        self.time.as_ref()
    }

    pub fn connectivity(&self) -> Option<&Connectivity> {
        self.connectivity.as_ref()
    }

    /// Build the time grid and hand the cycle period to the model.
    pub fn configure_time(&mut self, dt: f64, total_time: f64, cycles: usize) -> SolverResult<()> {
        let grid = TimeGrid::new(dt, total_time, cycles)?;
        self.model.set_cycle_period(total_time, cycles);
        debug!("time grid: dt={dt:e}, T={total_time}, Nt={}", grid.n_steps());
        self.time = Some(grid);
        Ok(())
    }

    /// Store the connectivity sets after checking them against the network.
    pub fn configure_connectivity(&mut self, connectivity: Connectivity) -> SolverResult<()> {
        connectivity.validate(&self.network)?;
        self.connectivity = Some(connectivity);
        Ok(())
    }

    /// Strict CFL test of `state` on vessel `vessel`.
    pub fn cfl_ok(&self, state: &VesselState, dx: f64, dt: f64, vessel: VesselIndex) -> SolverResult<bool> {
        let v = self.network.vessel(vessel)?;
        if state.n_nodes() != v.n_nodes() {
            return Err(SolverError::shape_mismatch(v.n_nodes(), state.n_nodes()));
        }
        let (courant, limit) = courant_numbers(&self.model, state, dx, dt, v);
        Ok(courant < limit)
    }

    /// Run the time loop.
    ///
    /// Returns [`RunStatus::Cached`] without computing anything when the
    /// cache already holds the run identity of `(case_name, dt, T)`.
    /// `reporter` receives the initial state and every `skip_frames`-th step.
    pub fn solve(
        &mut self,
        case_name: &str,
        reporter: Option<&mut dyn Reporter>,
        skip_frames: usize,
    ) -> SolverResult<SolveOutcome> {
        self.config.validate()?;
        if skip_frames == 0 {
            return Err(SolverError::InvalidConfig("skip_frames must be at least 1".into()));
        }
        let time = self.time.as_ref().ok_or(SolverError::NotConfigured("configure_time"))?;
        if self.connectivity.is_none() {
            return Err(SolverError::NotConfigured("configure_connectivity"));
        }

        let run_id = RunId::new(case_name, time.dt(), time.total_time());
        if self.cache.contains(&run_id) {
            info!("run {run_id} already computed; skipping");
            return Ok(SolveOutcome::cached(run_id));
        }

        let outcome = self.run(run_id, reporter, skip_frames)?;
        self.cache.commit(&outcome.run_id)?;
        Ok(outcome)
    }

    fn run(
        &self,
        run_id: RunId,
        mut reporter: Option<&mut dyn Reporter>,
        skip_frames: usize,
    ) -> SolverResult<SolveOutcome> {
        let (Some(time), Some(conn)) = (self.time.as_ref(), self.connectivity.as_ref()) else {
            return Err(SolverError::NotConfigured("configure_time and configure_connectivity"));
        };
        let started = Instant::now();
        let dt = time.dt();
        let n_steps = time.n_steps();

        info!(
            "solver set to dt={dt:.9}: {} steps, {} vessels, {} junctions, {} scheme",
            n_steps,
            self.network.n_vessels(),
            conn.n_junctions(),
            self.config.scheme.name()
        );

        let mut ctx = RunContext::new(self.initial_states()?);
        if let Some(r) = reporter.as_deref_mut() {
            r.start(&run_id);
            for (v, state) in ctx.prev.iter().enumerate() {
                self.emit(r, VesselIndex::new(v), 0, time, state);
            }
        }

        let newton = NewtonSolver::new(self.config.newton_tolerance, self.config.newton_max_iterations);
        let mut progress = self
            .config
            .verbose
            .then(|| ProgressReporter::new(time.total_time(), 10).with_diagnostics());

        for n in 1..=n_steps {
            let t = time.time(n);

            self.advance_all(&mut ctx, dt);
            self.apply_boundaries(&mut ctx, conn, t, dt)?;

            for &members in &conn.bifurcations {
                self.resolve_junction(&mut ctx, Junction::Bifurcation(members), &newton, n, dt)?;
            }
            for &members in &conn.conjunctions {
                self.resolve_junction(&mut ctx, Junction::Conjunction(members), &newton, n, dt)?;
            }

            let report_step = n % skip_frames == 0;
            for i in 0..self.network.n_vessels() {
                let v = VesselIndex::new(i);
                self.settle_vessel(
                    v,
                    n,
                    dt,
                    report_step,
                    &ctx.next[i],
                    &mut ctx.workspaces[i],
                    &mut ctx.committed[i],
                )?;
                if report_step {
                    if let Some(r) = reporter.as_deref_mut() {
                        self.emit(r, v, n, time, &ctx.committed[i]);
                    }
                }
            }

            ctx.commit();

            if let Some(p) = progress.as_mut() {
                p.step();
                let snapshot = ctx.snapshot(&self.network);
                p.maybe_report(t, Some(&snapshot));
            }
        }

        if let Some(p) = progress.as_ref() {
            p.finish(time.time(n_steps));
        }
        if let Some(r) = reporter.as_deref_mut() {
            r.finish(&run_id)?;
        }

        let wall_time = started.elapsed();
        let volumes = ctx
            .prev
            .iter()
            .zip(self.network.vessels())
            .map(|(s, v)| s.volume(v.dx()))
            .collect();
        if ctx.junctions.non_converged > 0 {
            warn!(
                "{} of {} junction solves hit the iteration cap",
                ctx.junctions.non_converged, ctx.junctions.solves
            );
        }
        info!("run {run_id} completed: {n_steps} steps in {wall_time:.2?}");

        Ok(SolveOutcome {
            status: RunStatus::Completed,
            run_id,
            steps: n_steps,
            junctions: ctx.junctions,
            final_states: ctx.prev,
            volumes,
            wall_time,
        })
    }

    /// Split step of one vessel followed by the checks of step `n`.
    ///
    /// `committed` receives the split result. The CFL gate, run when `gate` is
    /// set, reads the pre-split `candidate`.
    #[allow(clippy::too_many_arguments)]
    fn settle_vessel(
        &self,
        v: VesselIndex,
        n: usize,
        dt: f64,
        gate: bool,
        candidate: &VesselState,
        ws: &mut SchemeWorkspace,
        committed: &mut VesselState,
    ) -> SolverResult<()> {
        let vessel = &self.network.vessels()[v];
        self.config
            .scheme
            .split_step(&self.model, candidate, dt, vessel, ws, committed)?;

        if self.config.check_positive_area {
            if let Some((node, area)) = committed.first_nonphysical() {
                warn!("non-physical area {area:e} in vessel {v}, node {node}, step {n}");
                return Err(SolverError::NonPhysicalState {
                    vessel: v,
                    step: n,
                    node,
                    area,
                });
            }
        }

        if gate {
            let (courant, limit) = courant_numbers(&self.model, candidate, vessel.dx(), dt, vessel);
            if !(courant < limit) {
                warn!("solver failed in vessel {v} at time increment {n}: CFL condition violated");
                return Err(SolverError::StabilityViolation {
                    vessel: v,
                    step: n,
                    courant,
                    limit,
                });
            }
        }
        Ok(())
    }

    fn initial_states(&self) -> SolverResult<Vec<VesselState>> {
        self.network
            .vessels()
            .iter()
            .map(|vessel| {
                let state = self.bcs.initial_condition(&self.model, vessel);
                if state.n_nodes() != vessel.n_nodes() {
                    return Err(SolverError::shape_mismatch(vessel.n_nodes(), state.n_nodes()));
                }
                if self.config.check_positive_area {
                    if let Some((node, area)) = state.first_nonphysical() {
                        return Err(SolverError::NonPhysicalState {
                            vessel: vessel.index(),
                            step: 0,
                            node,
                            area,
                        });
                    }
                }
                Ok(state)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn advance_all(&self, ctx: &mut RunContext, dt: f64) {
        let scheme = self.config.scheme;
        for (((next, ws), prev), vessel) in ctx
            .next
            .iter_mut()
            .zip(ctx.workspaces.iter_mut())
            .zip(ctx.prev.iter())
            .zip(self.network.vessels())
        {
            scheme.advance(&self.model, prev, dt, vessel, ws, next);
        }
    }

    #[cfg(feature = "parallel")]
    fn advance_all(&self, ctx: &mut RunContext, dt: f64) {
        use rayon::prelude::*;

        let scheme = self.config.scheme;
        let model = &self.model;
        ctx.next
            .par_iter_mut()
            .zip(ctx.workspaces.par_iter_mut())
            .zip(ctx.prev.par_iter())
            .zip(self.network.vessels().par_iter())
            .for_each(|(((next, ws), prev), vessel)| scheme.advance(model, prev, dt, vessel, ws, next));
    }

    fn apply_boundaries(&self, ctx: &mut RunContext, conn: &Connectivity, t: f64, dt: f64) -> SolverResult<()> {
        let vessels = self.network.vessels();
        for &v in &conn.inlets {
            let vessel = &vessels[v];
            let bc = BoundaryContext {
                prev: &ctx.prev[v],
                time: t,
                dx: vessel.dx(),
                dt,
                vessel,
            };
            self.bcs.inlet(&self.model, &bc, &mut ctx.next[v])?;
        }
        for &v in &conn.outlets {
            let vessel = &vessels[v];
            let bc = BoundaryContext {
                prev: &ctx.prev[v],
                time: t,
                dx: vessel.dx(),
                dt,
                vessel,
            };
            self.bcs.outlet(&self.model, &bc, &mut ctx.next[v])?;
        }
        Ok(())
    }

    fn resolve_junction(
        &self,
        ctx: &mut RunContext,
        junction: Junction,
        newton: &NewtonSolver,
        step: usize,
        dt: f64,
    ) -> SolverResult<()> {
        let vessels = self.network.vessels();
        let members = junction.members();

        let mut x0 = Vec::with_capacity(2 * members.len());
        let mut u = Vec::with_capacity(2 * members.len());
        for (k, &v) in members.iter().enumerate() {
            let (node, interior) = junction_nodes(k, vessels[v].n_nodes());
            let (a, q) = ctx.prev[v].node(node);
            x0.extend([a, q]);
            let (a, q) = ctx.next[v].node(interior);
            u.extend([a, q]);
        }

        let residual = |x: &[f64]| match junction {
            Junction::Bifurcation([p, d1, d2]) => {
                self.bcs
                    .bifurcation_residual(&self.model, x, &u, dt, [&vessels[p], &vessels[d1], &vessels[d2]])
            }
            Junction::Conjunction([a, b]) => {
                self.bcs.conjunction_residual(&self.model, x, &u, dt, [&vessels[a], &vessels[b]])
            }
        };
        let jacobian = |x: &[f64]| match junction {
            Junction::Bifurcation([p, d1, d2]) => {
                self.bcs
                    .bifurcation_jacobian(&self.model, x, &u, dt, [&vessels[p], &vessels[d1], &vessels[d2]])
            }
            Junction::Conjunction([a, b]) => {
                self.bcs.conjunction_jacobian(&self.model, x, &u, dt, [&vessels[a], &vessels[b]])
            }
        };

        let outcome = newton.solve(residual, jacobian, &x0)?;
        ctx.junctions.record(outcome.iterations, outcome.residual_norm, outcome.converged);
        debug!(
            "{junction} at step {step}: {} iterations, |R| = {:.3e}",
            outcome.iterations, outcome.residual_norm
        );

        if !outcome.converged {
            warn!(
                "{junction} did not converge at step {step}: |R| = {:.3e} after {} iterations",
                outcome.residual_norm, outcome.iterations
            );
            if self.config.strict_junctions {
                return Err(SolverError::JunctionNonConvergence {
                    junction: junction.to_string(),
                    step,
                    iterations: outcome.iterations,
                    residual: outcome.residual_norm,
                });
            }
        }

        for (k, &v) in members.iter().enumerate() {
            let (node, _) = junction_nodes(k, vessels[v].n_nodes());
            ctx.next[v].set_node(node, outcome.x[2 * k], outcome.x[2 * k + 1]);
        }
        Ok(())
    }

    fn emit(&self, reporter: &mut dyn Reporter, v: VesselIndex, step: usize, time: &TimeGrid, state: &VesselState) {
        let vessel = &self.network.vessels()[v];
        let pressure = self.model.pressure(state, vessel);
        reporter.report(&Frame {
            vessel: v,
            step,
            time: time.time(step),
            times: time.times(),
            positions: vessel.x(),
            area: &state.a,
            flow: &state.q,
            pressure: &pressure,
            print: self.config.print_frames,
            persist: self.config.persist_frames,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{ArterialBoundaries, Inlet};
    use crate::equations::{ElasticTube, ViscoelasticTube};
    use crate::mesh::{Vessel, WallStiffness, Windkessel};
    use crate::simulation::report::CallbackReporter;
    use crate::solver::{Scheme, cfl_ok};

    fn single_vessel_solver(scheme: Scheme) -> FdmSolver<ElasticTube, ArterialBoundaries> {
        let vessel = Vessel::uniform(VesselIndex::new(0), 0.2, 41, 0.01, WallStiffness::default())
            .unwrap()
            .with_windkessel(Windkessel::new(1e7, 1e8, 1e-10));
        let network = VesselNetwork::new(vec![vessel]).unwrap();
        let bcs = ArterialBoundaries::new(Inlet::flow(|_| 0.0));
        FdmSolver::new(network, ElasticTube::blood(), bcs).with_config(SolverConfig::new(scheme))
    }

    #[test]
    fn test_solve_requires_configuration() {
        let mut solver = single_vessel_solver(Scheme::MacCormack);
        assert!(matches!(
            solver.solve("case", None, 1),
            Err(SolverError::NotConfigured(_))
        ));
        solver.configure_time(1e-5, 1e-4, 1).unwrap();
        assert!(matches!(
            solver.solve("case", None, 1),
            Err(SolverError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_zero_skip_frames_rejected() {
        let mut solver = single_vessel_solver(Scheme::MacCormack);
        solver.configure_time(1e-5, 1e-4, 1).unwrap();
        solver.configure_connectivity(Connectivity::single(0)).unwrap();
        assert!(matches!(solver.solve("case", None, 0), Err(SolverError::InvalidConfig(_))));
    }

    #[test]
    fn test_reporter_cadence() {
        let mut solver = single_vessel_solver(Scheme::MacCormack);
        solver.configure_time(1e-5, 1e-4, 1).unwrap();
        solver.configure_connectivity(Connectivity::single(0)).unwrap();

        let mut steps = Vec::new();
        let mut reporter = CallbackReporter::new(|f: &Frame<'_>| steps.push(f.step));
        let outcome = solver.solve("cadence", Some(&mut reporter), 3).unwrap();
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.steps, 10);
        assert_eq!(steps, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_empty_time_loop_completes() {
        let mut solver = single_vessel_solver(Scheme::MacCormack);
        solver.configure_time(1e-3, 1e-4, 1).unwrap();
        solver.configure_connectivity(Connectivity::single(0)).unwrap();

        let mut steps = Vec::new();
        let mut reporter = CallbackReporter::new(|f: &Frame<'_>| steps.push(f.step));
        let outcome = solver.solve("empty", Some(&mut reporter), 1).unwrap();
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.final_states.len(), 1);
        assert_eq!(steps, vec![0]);
    }

    #[test]
    fn test_cfl_violation_is_fatal() {
        let mut solver = single_vessel_solver(Scheme::LaxWendroff);
        // c ≈ 7 m/s at rest and dx = 5 mm, so dt = 1e-2 is far past the limit
        solver.configure_time(1e-2, 0.05, 1).unwrap();
        solver.configure_connectivity(Connectivity::single(0)).unwrap();
        let err = solver.solve("unstable", None, 1).unwrap_err();
        assert!(matches!(err, SolverError::StabilityViolation { step: 1, .. }), "{err}");
    }

    #[test]
    fn test_cfl_ok_checks_shape() {
        let solver = single_vessel_solver(Scheme::MacCormack);
        let bad = VesselState::zeros(3);
        assert!(solver.cfl_ok(&bad, 0.005, 1e-5, VesselIndex::new(0)).is_err());
        assert!(solver.cfl_ok(&bad, 0.005, 1e-5, VesselIndex::new(4)).is_err());
    }

    /// Viscoelastic vessel with dx = 1 cm and a strong wall viscosity, so one
    /// split step at dt = 1 ms all but flattens an interior flow spike.
    fn viscoelastic_solver() -> FdmSolver<ViscoelasticTube, ArterialBoundaries> {
        let vessel = Vessel::uniform(VesselIndex::new(0), 0.1, 11, 0.01, WallStiffness::default()).unwrap();
        let network = VesselNetwork::new(vec![vessel]).unwrap();
        let bcs = ArterialBoundaries::new(Inlet::flow(|_| 0.0));
        FdmSolver::new(network, ViscoelasticTube::new(ElasticTube::blood(), 2e5), bcs)
            .with_config(SolverConfig::new(Scheme::maccormack_godunov()))
    }

    fn spike(solver: &FdmSolver<ViscoelasticTube, ArterialBoundaries>, velocity: f64) -> VesselState {
        let a0 = solver.network.vessels()[0].a0(0);
        let mut state = VesselState::uniform(11, a0, 0.0);
        state.q[5] = velocity * a0;
        state
    }

    #[test]
    fn test_split_result_is_committed() {
        let solver = viscoelastic_solver();
        let candidate = spike(&solver, 1.0);
        let mut ws = SchemeWorkspace::new(11);
        let mut committed = VesselState::zeros(11);
        solver
            .settle_vessel(VesselIndex::new(0), 1, 1e-3, true, &candidate, &mut ws, &mut committed)
            .unwrap();

        assert_eq!(committed.a, candidate.a);
        assert!(committed.q[5] < 0.5 * candidate.q[5], "spike not diffused: {}", committed.q[5]);
        assert!(committed.q[4] > 0.0 && committed.q[6] > 0.0);
        assert_eq!(committed.q[0], candidate.q[0]);
        assert_eq!(committed.q[10], candidate.q[10]);
    }

    #[test]
    fn test_cfl_gate_reads_pre_split_state() {
        let solver = viscoelastic_solver();
        let vessel = &solver.network.vessels()[0];
        let dt = 1e-3;
        // u = 5 m/s on top of c ≈ 7 m/s breaks dt/dx = 0.1 before the split
        let candidate = spike(&solver, 5.0);
        assert!(!cfl_ok(&solver.model, &candidate, vessel.dx(), dt, vessel));

        let mut ws = SchemeWorkspace::new(11);
        let mut committed = VesselState::zeros(11);
        let err = solver
            .settle_vessel(VesselIndex::new(0), 7, dt, true, &candidate, &mut ws, &mut committed)
            .unwrap_err();
        assert!(matches!(err, SolverError::StabilityViolation { step: 7, .. }), "{err}");
        // The split result alone would have passed.
        assert!(cfl_ok(&solver.model, &committed, vessel.dx(), dt, vessel));

        // Off the reporting cadence the same state goes through.
        solver
            .settle_vessel(VesselIndex::new(0), 8, dt, false, &candidate, &mut ws, &mut committed)
            .unwrap();
    }

    #[test]
    fn test_junction_nodes() {
        assert_eq!(junction_nodes(0, 10), (9, 8));
        assert_eq!(junction_nodes(1, 10), (0, 1));
        assert_eq!(junction_nodes(2, 5), (0, 1));
    }

    #[test]
    fn test_junction_stats_record() {
        let mut stats = JunctionStats::default();
        stats.record(3, 1e-12, true);
        stats.record(100, 1e-6, false);
        assert_eq!(stats.solves, 2);
        assert_eq!(stats.non_converged, 1);
        assert_eq!(stats.max_iterations, 100);
        assert_eq!(stats.worst_residual, 1e-6);
    }
}
