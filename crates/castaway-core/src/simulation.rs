//! The simulation handle: one owner for the world, the stream, the log, and
//! the decision source.
//!
//! [`Simulation`] replaces any notion of global engine state. It tracks an
//! explicit [`RunState`] for the operator loop and a [`Mode`] for time
//! travel:
//!
//! - `jump_to` parks the live world and shows a snapshot. Stepping is
//!   refused until the caller either branches or resumes.
//! - `branch_from` rewinds the timeline for good: later events are dropped
//!   and the snapshot becomes the live world.
//! - `resume_live` restores the parked world and discards the view.
//!
//! The stream and id mint are never rewound, so a branch keeps minting
//! fresh ids and draws that do not collide with the discarded future.

use castaway_agents::memory::{self, IMPORTANCE_GOD};
use castaway_types::{AgentId, EventDetails, EventId, MemoryCategory};
use castaway_world::World;
use tracing::info;

use crate::decision::DecisionSource;
use crate::event_log::EventLog;
use crate::tick::{self, SimulationState, TickSummary};

/// Errors returned by the simulation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// The handle is showing a snapshot and cannot mutate the timeline.
    #[error("viewing snapshot {event}; branch or resume before changing the world")]
    Replaying {
        /// The event being viewed.
        event: EventId,
    },

    /// No event with this id exists in the log.
    #[error("event {0} is not in the log")]
    UnknownEvent(EventId),
}

/// Lifecycle of the operator loop driving the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Not running. Initial and final state.
    #[default]
    Stopped,
    /// Ticks are being executed.
    Running,
    /// The loop is alive but waiting to be resumed.
    Paused,
}

/// Whether the handle shows the live world or a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The world is the head of the timeline.
    #[default]
    Live,
    /// The world is a copy of the snapshot taken after `event`.
    Replay {
        /// The event being viewed.
        event: EventId,
    },
}

/// An island simulation with its decision source.
#[derive(Debug)]
pub struct Simulation<D> {
    state: SimulationState,
    source: D,
    run_state: RunState,
    mode: Mode,
    /// The live world while a snapshot is shown.
    parked: Option<World>,
}

impl<D: DecisionSource> Simulation<D> {
    /// Wrap prepared state and a decision source.
    pub fn new(state: SimulationState, source: D) -> Self {
        Self {
            state,
            source,
            run_state: RunState::Stopped,
            mode: Mode::Live,
            parked: None,
        }
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Replaying`] while a snapshot is shown.
    pub async fn step(&mut self) -> Result<TickSummary, SimulationError> {
        self.ensure_live()?;
        Ok(tick::run_tick(&mut self.state, &self.source).await)
    }

    /// Deliver an external message.
    ///
    /// An empty `recipients` list means every living agent. Dead or unknown
    /// recipients are ignored. Each recipient remembers the message; one
    /// `god_message` event lists everyone who received it. Returns `None`
    /// if nobody did.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Replaying`] while a snapshot is shown.
    pub fn god_message(
        &mut self,
        message: &str,
        recipients: &[AgentId],
    ) -> Result<Option<EventId>, SimulationError> {
        self.ensure_live()?;
        let world = &mut self.state.world;
        let targets: Vec<AgentId> = if recipients.is_empty() {
            world.living_ids()
        } else {
            recipients
                .iter()
                .copied()
                .filter(|&id| world.agent(id).is_some_and(|a| a.alive))
                .collect()
        };
        if targets.is_empty() {
            return Ok(None);
        }

        let tick = world.tick;
        let limit = self.state.rules.memory_limit;
        for &id in &targets {
            if let Some(agent) = world.agent_mut(id) {
                memory::remember(agent, tick, MemoryCategory::God, message, IMPORTANCE_GOD, Vec::new(), limit);
            }
        }
        info!(tick, recipients = targets.len(), "god message delivered");
        let id = self.state.emit(
            targets.clone(),
            EventDetails::GodMessage {
                message: String::from(message),
                recipients: targets,
            },
        );
        Ok(Some(id))
    }

    /// Show the world as it stood after `event` without touching the log.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEvent`] if no snapshot exists.
    pub fn jump_to(&mut self, event: EventId) -> Result<&World, SimulationError> {
        let snapshot = self
            .state
            .log
            .jump_to(event)
            .ok_or(SimulationError::UnknownEvent(event))?;
        let live = std::mem::replace(&mut self.state.world, snapshot);
        if self.mode == Mode::Live {
            self.parked = Some(live);
        }
        self.mode = Mode::Replay { event };
        info!(event_id = %event, tick = self.state.world.tick, "jumped to snapshot");
        Ok(&self.state.world)
    }

    /// Rewind to `event`, dropping every later event, and go live there.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEvent`] if no snapshot exists.
    pub fn branch_from(&mut self, event: EventId) -> Result<&World, SimulationError> {
        let world = self
            .state
            .log
            .branch_from(event)
            .ok_or(SimulationError::UnknownEvent(event))?;
        self.state.world = world;
        self.parked = None;
        self.mode = Mode::Live;
        info!(event_id = %event, tick = self.state.world.tick, "branched timeline");
        Ok(&self.state.world)
    }

    /// Leave replay mode and restore the live world. No-op when live.
    pub fn resume_live(&mut self) {
        if let Some(live) = self.parked.take() {
            self.state.world = live;
        }
        self.mode = Mode::Live;
    }

    /// Mark the operator loop as running.
    pub const fn start(&mut self) {
        self.run_state = RunState::Running;
    }

    /// Mark the operator loop as paused.
    pub const fn pause(&mut self) {
        self.run_state = RunState::Paused;
    }

    /// Mark the operator loop as stopped.
    pub const fn stop(&mut self) {
        self.run_state = RunState::Stopped;
    }

    /// Current run state.
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Current mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The world currently shown (live or snapshot).
    pub const fn world(&self) -> &World {
        &self.state.world
    }

    /// The event log.
    pub const fn log(&self) -> &EventLog {
        &self.state.log
    }

    /// All engine state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The decision source.
    pub const fn source(&self) -> &D {
        &self.source
    }

    /// Tear the handle apart, resuming live first.
    pub fn into_parts(mut self) -> (SimulationState, D) {
        self.resume_live();
        (self.state, self.source)
    }

    const fn ensure_live(&self) -> Result<(), SimulationError> {
        match self.mode {
            Mode::Live => Ok(()),
            Mode::Replay { event } => Err(SimulationError::Replaying { event }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_agents::{AgentOverrides, AgentRules, create_agent};
    use castaway_types::{EventType, Gender, Position, Terrain};
    use castaway_world::{SimRng, UniformGenerator, generate_world};

    use super::*;
    use crate::decision::LocalDecisionSource;
    use crate::tick::TickSettings;

    fn simulation(agents: usize) -> Simulation<LocalDecisionSource> {
        let generator = UniformGenerator {
            terrain: Terrain::Grass,
            with_resources: false,
        };
        let world = generate_world(&generator, 12, 12, &mut SimRng::new(0)).unwrap();
        let settings = TickSettings {
            weather_change_chance: 0.0,
            batch_size: 2,
        };
        let mut state = SimulationState::new(world, 5, AgentRules::default(), settings);
        for i in 0..agents {
            let x = i32::try_from(i).unwrap().saturating_mul(4);
            let agent = create_agent(
                state.mint.mint(),
                AgentOverrides {
                    gender: Some(Gender::Male),
                    age: Some(300),
                    location: Some(Position::new(x, 0)),
                    ..AgentOverrides::default()
                },
                &state.rules,
                &mut state.rng,
            );
            state.world.add_agent(agent);
        }
        Simulation::new(state, LocalDecisionSource::new())
    }

    #[tokio::test]
    async fn jump_blocks_steps_until_resumed() {
        let mut sim = simulation(1);
        sim.step().await.unwrap();
        sim.step().await.unwrap();
        let first = sim.log().events().first().unwrap().id;
        let head_tick = sim.world().tick;

        let viewed_tick = sim.jump_to(first).unwrap().tick;
        assert_eq!(viewed_tick, 0);
        assert!(matches!(sim.step().await, Err(SimulationError::Replaying { .. })));

        sim.resume_live();
        assert_eq!(sim.mode(), Mode::Live);
        assert_eq!(sim.world().tick, head_tick);
        assert!(sim.step().await.is_ok());
    }

    #[tokio::test]
    async fn branch_truncates_and_goes_live() {
        let mut sim = simulation(1);
        for _ in 0..3 {
            sim.step().await.unwrap();
        }
        let first = sim.log().events().first().unwrap().id;
        sim.jump_to(first).unwrap();
        sim.branch_from(first).unwrap();
        assert_eq!(sim.mode(), Mode::Live);
        assert_eq!(sim.log().len(), 1);
        assert_eq!(sim.world().tick, 0);
        sim.step().await.unwrap();
        let newest = sim.log().events().last().unwrap();
        assert_eq!(newest.parent_event_id, Some(first));
    }

    #[tokio::test]
    async fn unknown_snapshot_is_an_error() {
        let mut sim = simulation(1);
        let mut mint = castaway_types::IdMint::new(99);
        let stranger: EventId = mint.mint();
        assert_eq!(sim.jump_to(stranger).err(), Some(SimulationError::UnknownEvent(stranger)));
        assert_eq!(sim.mode(), Mode::Live);
    }

    #[test]
    fn god_message_reaches_everyone_by_default() {
        let mut sim = simulation(3);
        let id = sim.god_message("Storm is coming", &[]).unwrap().unwrap();
        let event = sim.log().get(id).unwrap();
        assert_eq!(event.event_type, EventType::GodMessage);
        assert_eq!(event.agents.len(), 3);
        for agent in &sim.world().agents {
            let last = agent.memories.last().unwrap();
            assert_eq!(last.category, MemoryCategory::God);
            assert_eq!(last.description, "Storm is coming");
        }
    }

    #[test]
    fn god_message_skips_the_dead() {
        let mut sim = simulation(2);
        let dead = sim.world().agents.first().unwrap().id;
        sim.state.world.agent_mut(dead).unwrap().alive = false;
        assert_eq!(sim.god_message("hello", &[dead]).unwrap(), None);
        assert!(sim.log().is_empty());
    }

    #[test]
    fn run_state_transitions() {
        let mut sim = simulation(0);
        assert_eq!(sim.run_state(), RunState::Stopped);
        sim.start();
        assert_eq!(sim.run_state(), RunState::Running);
        sim.pause();
        assert_eq!(sim.run_state(), RunState::Paused);
        sim.stop();
        assert_eq!(sim.run_state(), RunState::Stopped);
    }
}
