//! Tick callback that keeps a daily chronicle of the run.
//!
//! Per-tick summaries are folded into a [`DayReport`] which is logged when
//! the last hour of a day has been executed, and once more for the partial
//! day when the run ends.

use castaway_core::runner::TickCallback;
use castaway_core::{SimulationState, TickSummary};
use castaway_world::clock;
use tracing::info;

/// Totals for one simulated day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayReport {
    /// Zero-based day number.
    pub day: u64,
    /// Ticks of this day that were executed.
    pub ticks: u64,
    /// Children born.
    pub births: usize,
    /// Agents who died.
    pub deaths: usize,
    /// Pregnancies started.
    pub conceptions: u32,
    /// Actions that changed the world.
    pub actions_applied: u32,
    /// Actions rejected by validation.
    pub actions_skipped: u32,
    /// Decision errors logged.
    pub decision_errors: u32,
    /// Turns decided by the local heuristic.
    pub fallbacks: u32,
    /// Living agents after the last executed tick.
    pub agents_alive: usize,
}

/// Callback accumulating [`DayReport`]s.
#[derive(Debug, Default)]
pub struct ChronicleCallback {
    current: Option<DayReport>,
    finished: Vec<DayReport>,
}

impl ChronicleCallback {
    /// Empty chronicle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports for every completed day so far.
    pub fn days(&self) -> &[DayReport] {
        &self.finished
    }

    /// Close the partial day, if any, and return every report.
    pub fn finish(mut self) -> Vec<DayReport> {
        if let Some(partial) = self.current.take() {
            log_day(&partial);
            self.finished.push(partial);
        }
        self.finished
    }
}

impl TickCallback for ChronicleCallback {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        let day = clock::day_of(summary.tick);
        let report = self.current.get_or_insert_with(|| DayReport {
            day,
            ..DayReport::default()
        });
        report.ticks = report.ticks.saturating_add(1);
        report.births = report.births.saturating_add(summary.births.len());
        report.deaths = report.deaths.saturating_add(summary.deaths.len());
        report.conceptions = report.conceptions.saturating_add(summary.conceptions);
        report.actions_applied = report.actions_applied.saturating_add(summary.actions_applied);
        report.actions_skipped = report.actions_skipped.saturating_add(summary.actions_skipped);
        report.decision_errors = report.decision_errors.saturating_add(summary.decision_errors);
        report.fallbacks = report.fallbacks.saturating_add(summary.fallbacks);
        report.agents_alive = summary.agents_alive;

        let day_over = clock::hour_of(summary.tick) == clock::TICKS_PER_DAY.saturating_sub(1);
        if day_over && let Some(done) = self.current.take() {
            log_day(&done);
            self.finished.push(done);
        }
    }
}

fn log_day(report: &DayReport) {
    info!(
        day = report.day,
        ticks = report.ticks,
        births = report.births,
        deaths = report.deaths,
        conceptions = report.conceptions,
        actions_applied = report.actions_applied,
        actions_skipped = report.actions_skipped,
        decision_errors = report.decision_errors,
        fallbacks = report.fallbacks,
        agents_alive = report.agents_alive,
        "day complete"
    );
}
