//! Simulation loop runner with operator controls.
//!
//! [`run_simulation`] drives a [`Simulation`] on a fixed interval with
//! support for:
//!
//! - **Bounded runs**: stop once the world clock reaches `max_ticks`
//! - **Pause/resume**: the loop parks between ticks until resumed
//! - **Variable tick speed**: the interval is re-read before every sleep
//! - **Queued messages**: operator messages are delivered before each tick
//! - **Clean shutdown**: operator stop and extinction end the loop
//!
//! Only one tick ever runs at a time: the loop awaits each tick before
//! sleeping and starting the next.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::decision::DecisionSource;
use crate::operator::{OperatorState, SimulationEndReason};
use crate::simulation::{Simulation, SimulationError};
use crate::tick::{SimulationState, TickSummary};

/// Errors that can end the loop early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The handle refused to step.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying handle error.
        #[from]
        source: SimulationError,
    },
}

/// Result of a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this run.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if the handle is showing a snapshot when the
/// loop tries to step.
pub async fn run_simulation<D: DecisionSource>(
    sim: &mut Simulation<D>,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = ?operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        source = sim.source().name(),
        start_tick = sim.world().tick,
        "simulation starting"
    );
    sim.start();

    let end_reason = loop {
        if operator.is_paused() {
            sim.pause();
            info!(tick = sim.world().tick, "simulation paused");
            operator.wait_if_paused().await;
            sim.start();
            info!(tick = sim.world().tick, "simulation resumed");
        }

        if operator.is_stop_requested() {
            info!("operator stop requested");
            break SimulationEndReason::OperatorStop;
        }

        if operator.tick_limit_reached(sim.world().tick) {
            break SimulationEndReason::MaxTicksReached;
        }

        for queued in operator.drain_messages().await {
            if let Err(err) = sim.god_message(&queued.message, &queued.recipients) {
                warn!(error = %err, "queued message not delivered");
            }
        }

        let summary = match sim.step().await {
            Ok(summary) => summary,
            Err(err) => {
                sim.stop();
                return Err(err.into());
            }
        };
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, sim.state());

        let extinct = summary.agents_alive == 0;
        last_summary = Some(summary);
        if extinct {
            info!(tick = sim.world().tick, "all agents dead, extinction");
            break SimulationEndReason::Extinction;
        }
        if operator.tick_limit_reached(sim.world().tick) {
            info!(tick = sim.world().tick, max_ticks = ?operator.max_ticks(), "tick limit reached");
            break SimulationEndReason::MaxTicksReached;
        }

        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    };

    sim.stop();
    operator.set_end_reason(end_reason).await;
    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = %result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_agents_alive = result.final_summary.as_ref().map(|s| s.agents_alive),
        "simulation ended"
    );

    if let Some(summary) = &result.final_summary {
        info!(
            tick = summary.tick,
            agents_alive = summary.agents_alive,
            weather = ?summary.weather,
            "final tick summary"
        );
    } else {
        warn!("simulation ended with no ticks executed");
    }
}
