//! Console progress for long network runs.

use std::time::Instant;

/// Network-wide quantities printed alongside progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NetworkSnapshot {
    /// Σ ∫A dx over all vessels [m³]
    pub total_volume: f64,
    /// Smallest nodal area in the network [m²]
    pub min_area: f64,
    /// Junction solves that hit the iteration cap so far
    pub non_converged: usize,
}

impl NetworkSnapshot {
    /// Compact one-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "V={:.4e} m³ | A_min={:.4e} m² | junction misses={}",
            self.total_volume, self.min_area, self.non_converged
        )
    }
}

/// Progress reporter for long-running simulations.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    /// Start time of simulation (wall clock)
    start_instant: Instant,
    /// Total simulated time to reach
    total_sim_time: f64,
    /// Last reported progress percentage
    last_reported_pct: u32,
    /// Report interval in percentage points
    report_interval_pct: u32,
    /// Whether to print the network snapshot with progress
    print_diagnostics: bool,
    /// Number of time steps taken
    n_steps: usize,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    /// * `total_sim_time` - Total simulated time to reach
    /// * `report_interval_pct` - Report every N percent (e.g., 10 for 10%, 20%, ...)
    pub fn new(total_sim_time: f64, report_interval_pct: u32) -> Self {
        Self {
            start_instant: Instant::now(),
            total_sim_time,
            last_reported_pct: 0,
            report_interval_pct: report_interval_pct.max(1),
            print_diagnostics: false,
            n_steps: 0,
        }
    }

    /// Print the network snapshot with each progress line.
    pub fn with_diagnostics(mut self) -> Self {
        self.print_diagnostics = true;
        self
    }

    /// Record a time step.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    /// Number of recorded steps.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Report if the next percentage threshold was crossed.
    ///
    /// Returns true if progress was reported.
    pub fn maybe_report(&mut self, current_time: f64, snapshot: Option<&NetworkSnapshot>) -> bool {
        let pct = self.percent(current_time) as u32;
        let threshold = self.last_reported_pct + self.report_interval_pct;

        if pct >= threshold || (pct == 100 && self.last_reported_pct < 100) {
            self.report(current_time, snapshot);
            self.last_reported_pct = (pct / self.report_interval_pct) * self.report_interval_pct;
            true
        } else {
            false
        }
    }

    /// Force a progress report.
    pub fn report(&self, current_time: f64, snapshot: Option<&NetworkSnapshot>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = self.percent(current_time);

        let eta = if pct > 0.1 {
            format_duration(elapsed * 100.0 / pct - elapsed)
        } else {
            "calculating...".to_string()
        };

        print!(
            "\r[{:>5.1}%] t={:.4}s | elapsed={} | ETA={} | {:.0} steps/s",
            pct,
            current_time,
            format_duration(elapsed),
            eta,
            self.steps_per_sec(elapsed)
        );

        if self.print_diagnostics {
            if let Some(s) = snapshot {
                print!(" | {}", s.summary_line());
            }
        }

        println!();
    }

    /// Print final summary.
    pub fn finish(&self, final_time: f64) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();

        println!();
        println!("=== Simulation Complete ===");
        println!("Final time:    {final_time:.4} s");
        println!(
            "Wall time:     {} ({:.1} steps/s)",
            format_duration(elapsed),
            self.steps_per_sec(elapsed)
        );
        println!("Total steps:   {}", self.n_steps);
    }

    fn percent(&self, current_time: f64) -> f64 {
        if self.total_sim_time > 0.0 {
            (current_time / self.total_sim_time * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        }
    }

    fn steps_per_sec(&self, elapsed: f64) -> f64 {
        if elapsed > 0.0 { self.n_steps as f64 / elapsed } else { 0.0 }
    }
}

/// Format a duration in seconds as human-readable string.
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = secs - mins * 60.0;
        format!("{:.0}m{:.0}s", mins, s)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12.34), "12.3s");
        assert_eq!(format_duration(125.0), "2m5s");
        assert_eq!(format_duration(7260.0), "2h1m");
    }

    #[test]
    fn test_maybe_report_thresholds() {
        let mut progress = ProgressReporter::new(1.0, 25);
        assert!(!progress.maybe_report(0.1, None));
        assert!(progress.maybe_report(0.26, None));
        assert!(!progress.maybe_report(0.3, None));
        assert!(progress.maybe_report(0.5, None));
        assert!(progress.maybe_report(1.0, None));
        assert!(!progress.maybe_report(1.0, None));
    }

    #[test]
    fn test_step_counter() {
        let mut progress = ProgressReporter::new(1.0, 10).with_diagnostics();
        progress.step();
        progress.step();
        assert_eq!(progress.n_steps(), 2);
    }

    #[test]
    fn test_snapshot_summary() {
        let s = NetworkSnapshot {
            total_volume: 1e-5,
            min_area: 2e-5,
            non_converged: 3,
        };
        let line = s.summary_line();
        assert!(line.contains("junction misses=3"));
    }
}
