//! Reporting hook invoked by the solver.

use crate::solver::SolverResult;
use crate::types::VesselIndex;

use super::run_id::RunId;

/// One reported vessel state at one time step.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Vessel the frame belongs to
    pub vessel: VesselIndex,
    /// Time step index (0 for the initial state)
    pub step: usize,
    /// Time at `step`
    pub time: f64,
    /// Full time grid of the run
    pub times: &'a [f64],
    /// Node positions of the vessel
    pub positions: &'a [f64],
    /// Cross-sectional area per node
    pub area: &'a [f64],
    /// Flow rate per node
    pub flow: &'a [f64],
    /// Pressure per node
    pub pressure: &'a [f64],
    /// Caller wants the frame printed
    pub print: bool,
    /// Caller wants the frame persisted
    pub persist: bool,
}

/// Receiver of solver frames.
///
/// `start` is called once before the first frame of a computed run. `report`
/// is called for the initial state of every vessel and then on every
/// `skip_frames`-th step. `finish` is called once after the last step of a
/// completed run, never for cached or aborted runs.
pub trait Reporter {
    fn start(&mut self, _run_id: &RunId) {}

    fn report(&mut self, frame: &Frame<'_>);

    fn finish(&mut self, _run_id: &RunId) -> SolverResult<()> {
        Ok(())
    }
}

/// Reporter that forwards frames to a closure.
pub struct CallbackReporter<F> {
    callback: F,
}

impl<F> CallbackReporter<F>
where
    F: FnMut(&Frame<'_>),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Reporter for CallbackReporter<F>
where
    F: FnMut(&Frame<'_>),
{
    fn report(&mut self, frame: &Frame<'_>) {
        (self.callback)(frame);
    }
}
