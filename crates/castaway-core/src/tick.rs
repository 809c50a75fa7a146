//! Tick cycle: the eight-phase pipeline that advances the island by one hour.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Order** -- shuffle the living agents.
//! 2. **Lifecycle** -- age everyone, log stage changes, process elder deaths.
//! 3. **Nutrition** -- reset meals at dawn, eat, run the end-of-day check and
//!    process starvation deaths.
//! 4. **Procreation** -- deliver due pregnancies, otherwise conceive when an
//!    adult woman shares a tile with an adult man.
//! 5. **Removal** -- drop dead agents from the world.
//! 6. **Dispatch** -- reshuffle; ask the [`DecisionSource`] for one action
//!    per agent in concurrent batches, then validate, resolve, and log each
//!    one serially in the shuffled order.
//! 7. **Weather** -- roll for a sun/rain toggle; rain waters every field.
//! 8. **Clock** -- advance the tick and recompute day/night.
//!
//! No phase fails. Missing agents and invalid actions become skips; decision
//! trouble becomes a `decision_error` or `decision_fallback` event.
//!
//! # Determinism
//!
//! Given the same world, seed, and decision outcomes the pipeline produces
//! the same events with the same ids. RNG draws happen in phase order:
//! shuffle, elder mortality, births, reshuffle, fallback steps, weather.

use castaway_agents::{
    AgentRules, DailyVerdict, DeathRecord, ResolveContext, conceive, deliver, find_partner,
    nutrition_phase, process_death, resolve, tick_age, validate_call,
};
use castaway_types::{
    ActionCall, AgentId, DeathReason, DecidedCall, Event, EventDetails, EventId, IdMint, Weather,
};
use castaway_world::{SimRng, World, roll_weather};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::decision::{DecisionOutcome, DecisionRequest, DecisionSource, DecisionTelemetry};
use crate::event_log::EventLog;
use crate::fallback;
use crate::perception;

/// Engine tunables that are not agent rules.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSettings {
    /// Per-tick probability that the weather toggles.
    pub weather_change_chance: f64,
    /// Decision requests awaited together.
    pub batch_size: usize,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            weather_change_chance: 0.05,
            batch_size: 5,
        }
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// The tick that was executed.
    pub tick: u64,
    /// Weather at the end of the tick.
    pub weather: Weather,
    /// Living agents at the end of the tick.
    pub agents_alive: usize,
    /// Deaths this tick, in processing order.
    pub deaths: Vec<DeathRecord>,
    /// Children born this tick.
    pub births: Vec<AgentId>,
    /// Pregnancies started this tick.
    pub conceptions: u32,
    /// Actions that validated, resolved, and were logged.
    pub actions_applied: u32,
    /// Actions dropped by validation or resolution.
    pub actions_skipped: u32,
    /// `decision_error` events logged.
    pub decision_errors: u32,
    /// `decision_fallback` events logged.
    pub fallbacks: u32,
    /// Events appended this tick.
    pub events_logged: usize,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The island and everyone on it.
    pub world: World,
    /// The single random stream.
    pub rng: SimRng,
    /// Deterministic id source.
    pub mint: IdMint,
    /// Causal history with snapshots.
    pub log: EventLog,
    /// Agent rule constants.
    pub rules: AgentRules,
    /// Engine tunables.
    pub settings: TickSettings,
}

impl SimulationState {
    /// Fresh state over `world` with a stream and id mint seeded by `seed`.
    pub fn new(world: World, seed: u64, rules: AgentRules, settings: TickSettings) -> Self {
        Self {
            world,
            rng: SimRng::new(seed),
            mint: IdMint::new(seed),
            log: EventLog::new(),
            rules,
            settings,
        }
    }

    /// Fresh state over `world` with every tunable taken from `config`.
    pub fn from_config(world: World, config: &SimulationConfig) -> Self {
        let settings = TickSettings {
            weather_change_chance: config.environment.weather_change_chance,
            batch_size: config.decision.batch_size,
        };
        Self::new(world, config.world.seed, config.to_rules(), settings)
    }

    /// Mint an event id, build the event, and append it with a snapshot.
    pub fn emit(&mut self, agents: Vec<AgentId>, details: EventDetails) -> EventId {
        let event = Event::new(self.mint.mint(), self.world.tick, agents, details);
        self.log.log_event(event, &self.world)
    }
}

/// Execute one complete tick of the simulation.
///
/// Runs all eight phases in sequence and returns a summary of what
/// happened. The world clock has advanced by one when this returns.
pub async fn run_tick<D: DecisionSource>(state: &mut SimulationState, source: &D) -> TickSummary {
    let tick = state.world.tick;
    let events_before = state.log.len();
    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    let mut order = state.world.living_ids();
    state.rng.shuffle(&mut order);

    phase_lifecycle(state, &order, &mut summary);
    phase_nutrition(state, &order, &mut summary);
    phase_procreation(state, &order, &mut summary);

    let removed = state.world.remove_dead();
    if removed > 0 {
        debug!(tick, removed, "dead agents removed");
    }

    phase_dispatch(state, source, &mut summary).await;
    phase_weather(state);

    state.world.advance_clock();

    summary.weather = state.world.weather;
    summary.agents_alive = state.world.living_agents().count();
    summary.events_logged = state.log.len().saturating_sub(events_before);

    info!(
        tick,
        agents_alive = summary.agents_alive,
        births = summary.births.len(),
        deaths = summary.deaths.len(),
        actions = summary.actions_applied,
        skipped = summary.actions_skipped,
        events = summary.events_logged,
        "tick complete"
    );

    summary
}

// ---------------------------------------------------------------------------
// Lifecycle, nutrition, procreation
// ---------------------------------------------------------------------------

/// Phase 2: aging, stage transitions, and elder mortality.
fn phase_lifecycle(state: &mut SimulationState, order: &[AgentId], summary: &mut TickSummary) {
    let rules = state.rules.clone();
    for &id in order {
        let Some(agent) = state.world.agent_mut(id) else {
            continue;
        };
        let report = tick_age(
            agent,
            rules.child_duration,
            rules.elder_age,
            rules.elder_death_chance,
            &mut state.rng,
        );
        if let Some((from, to)) = report.transition {
            debug!(agent_id = %id, ?from, ?to, "stage change");
            state.emit(vec![id], EventDetails::StatusChange { from, to });
        }
        if report.died {
            record_death(state, id, DeathReason::OldAge, summary);
        }
    }
}

/// Phase 3: meals and the daily check.
fn phase_nutrition(state: &mut SimulationState, order: &[AgentId], summary: &mut TickSummary) {
    let tick = state.world.tick;
    let meals = state.rules.meals_per_day;
    for &id in order {
        let Some(agent) = state.world.agent_mut(id) else {
            continue;
        };
        let report = nutrition_phase(agent, tick, meals);
        match report.verdict {
            Some(DailyVerdict::Starved) => record_death(state, id, DeathReason::Starvation, summary),
            Some(DailyVerdict::Starving) => debug!(tick, agent_id = %id, "agent is starving"),
            Some(DailyVerdict::Fed) | None => {}
        }
    }
}

/// Apply death consequences and log `resource_drop` (if anything was
/// carried) followed by `death`.
fn record_death(state: &mut SimulationState, id: AgentId, reason: DeathReason, summary: &mut TickSummary) {
    let tick = state.world.tick;
    let Some(record) = process_death(&mut state.world, id, reason, tick, state.rules.memory_limit) else {
        return;
    };
    if !record.dropped.is_empty() {
        state.emit(
            vec![id],
            EventDetails::ResourceDrop {
                at: record.at,
                items: record.dropped.clone(),
            },
        );
    }
    state.emit(
        vec![id],
        EventDetails::Death {
            reason,
            age: record.age,
            at: record.at,
        },
    );
    summary.deaths.push(record);
}

/// Phase 4: births first, then conceptions. A mother who gives birth does
/// not conceive again on the same tick.
fn phase_procreation(state: &mut SimulationState, order: &[AgentId], summary: &mut TickSummary) {
    let tick = state.world.tick;
    let rules = state.rules.clone();
    for &id in order {
        if let Some(birth) = deliver(&mut state.world, id, tick, &rules, &mut state.mint, &mut state.rng) {
            info!(tick, mother = %birth.mother, child = %birth.child, name = %birth.name, "child born");
            summary.births.push(birth.child);
            state.emit(
                vec![birth.mother, birth.father, birth.child],
                EventDetails::Birth {
                    mother: birth.mother,
                    father: birth.father,
                    child: birth.child,
                    name: birth.name,
                    gender: birth.gender,
                },
            );
            continue;
        }
        let Some(father) = find_partner(&state.world, id) else {
            continue;
        };
        if let Some(conception) = conceive(&mut state.world, id, father, tick, &rules) {
            summary.conceptions = summary.conceptions.saturating_add(1);
            state.emit(
                vec![conception.mother, conception.father],
                EventDetails::Procreate {
                    mother: conception.mother,
                    father: conception.father,
                    due_tick: conception.due_tick,
                },
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Phase 6: decide, validate, resolve, and log one action per agent.
///
/// Requests within a batch run concurrently against the world as it stood
/// when the batch was assembled. Results are applied one at a time in the
/// shuffled order, so later batches see earlier batches' effects.
async fn phase_dispatch<D: DecisionSource>(state: &mut SimulationState, source: &D, summary: &mut TickSummary) {
    let mut order = state.world.living_ids();
    state.rng.shuffle(&mut order);
    let batch_size = state.settings.batch_size.max(1);

    for batch in order.chunks(batch_size) {
        let mut requests = Vec::with_capacity(batch.len());
        for &id in batch {
            perception::observe(&mut state.world, id, &state.rules);
            if let Some(view) = perception::assemble(&state.world, id, &state.rules) {
                requests.push(DecisionRequest {
                    agent_id: id,
                    status: view.self_state.status,
                    perception: view,
                });
            }
        }

        let ids: Vec<AgentId> = requests.iter().map(|r| r.agent_id).collect();
        let outcomes = join_all(requests.into_iter().map(|r| source.decide(r))).await;

        for (id, outcome) in ids.into_iter().zip(outcomes) {
            apply_outcome(state, source.name(), id, outcome, summary);
        }
    }
}

/// Turn one decision outcome into at most one applied action.
fn apply_outcome(
    state: &mut SimulationState,
    source: &str,
    id: AgentId,
    outcome: DecisionOutcome,
    summary: &mut TickSummary,
) {
    match outcome {
        DecisionOutcome::Calls { calls, telemetry } => {
            if let Some(t) = &telemetry {
                log_telemetry(state.world.tick, id, t);
            }
            match calls.into_iter().next() {
                Some(DecidedCall::Known(call)) => apply_call(state, id, &call, summary),
                Some(DecidedCall::Unknown { name }) => {
                    warn!(tick = state.world.tick, agent_id = %id, %name, "unknown action");
                    decision_error(state, id, format!("unknown action: {name}"), summary);
                }
                None => decision_error(state, id, format!("{source} returned no action"), summary),
            }
        }
        DecisionOutcome::Exhausted { reason } => {
            warn!(tick = state.world.tick, agent_id = %id, %reason, "decision retries exhausted");
            decision_error(state, id, reason, summary);
        }
        DecisionOutcome::Unavailable { reason } => {
            warn!(tick = state.world.tick, agent_id = %id, %reason, "decision source unavailable");
            state.emit(vec![id], EventDetails::DecisionFallback { reason });
            summary.fallbacks = summary.fallbacks.saturating_add(1);
            apply_fallback(state, id, summary);
        }
        DecisionOutcome::Local => apply_fallback(state, id, summary),
    }
}

fn decision_error(state: &mut SimulationState, id: AgentId, reason: String, summary: &mut TickSummary) {
    state.emit(vec![id], EventDetails::DecisionError { reason });
    summary.decision_errors = summary.decision_errors.saturating_add(1);
}

/// Run the local heuristic against a fresh view of the world.
fn apply_fallback(state: &mut SimulationState, id: AgentId, summary: &mut TickSummary) {
    let Some(view) = perception::assemble(&state.world, id, &state.rules) else {
        return;
    };
    if let Some(call) = fallback::choose(&state.world, &view, &mut state.rng) {
        apply_call(state, id, &call, summary);
    }
}

/// Validate, resolve, and log one action. Skips leave no trace.
fn apply_call(state: &mut SimulationState, id: AgentId, call: &ActionCall, summary: &mut TickSummary) {
    let tick = state.world.tick;
    let checked = validate_call(&state.world, id, call, tick, &state.rules).and_then(|()| {
        let ctx = ResolveContext {
            tick,
            rules: &state.rules,
        };
        resolve(&mut state.world, id, call, &ctx, &mut state.mint)
    });
    match checked {
        Ok(outcome) => {
            state.emit(outcome.agents, outcome.details);
            summary.actions_applied = summary.actions_applied.saturating_add(1);
        }
        Err(skip) => {
            debug!(tick, agent_id = %id, action = call.name(), %skip, "action skipped");
            summary.actions_skipped = summary.actions_skipped.saturating_add(1);
        }
    }
}

fn log_telemetry(tick: u64, id: AgentId, t: &DecisionTelemetry) {
    info!(
        tick,
        agent_id = %id,
        backend = %t.backend,
        model = %t.model,
        prompt_tokens = t.prompt_tokens,
        completion_tokens = t.completion_tokens,
        latency_ms = t.latency_ms,
        attempts = t.attempts,
        "decision received"
    );
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Phase 7: one weather draw; log the change if the weather toggled.
fn phase_weather(state: &mut SimulationState) {
    let chance = state.settings.weather_change_chance;
    if let Some(shift) = roll_weather(&mut state.world, &mut state.rng, chance) {
        state.emit(
            Vec::new(),
            EventDetails::WeatherChange {
                from: shift.from,
                to: shift.to,
                fields_watered: shift.fields_watered,
            },
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use castaway_agents::{AgentOverrides, create_agent};
    use castaway_types::{EventType, Gender, LifeStage, Position, Resource, Terrain};
    use castaway_world::{UniformGenerator, generate_world};

    use super::*;
    use crate::decision::{LocalDecisionSource, ScriptedDecisionSource};

    fn quiet_settings() -> TickSettings {
        TickSettings {
            weather_change_chance: 0.0,
            batch_size: 5,
        }
    }

    fn state_with(agents: &[(Gender, u64, Position)]) -> (SimulationState, Vec<AgentId>) {
        let generator = UniformGenerator {
            terrain: Terrain::Grass,
            with_resources: false,
        };
        let world = generate_world(&generator, 10, 10, &mut SimRng::new(0)).unwrap();
        let mut state = SimulationState::new(world, 9, AgentRules::default(), quiet_settings());
        let mut ids = Vec::new();
        for &(gender, age, at) in agents {
            let agent = create_agent(
                state.mint.mint(),
                AgentOverrides {
                    gender: Some(gender),
                    age: Some(age),
                    location: Some(at),
                    ..AgentOverrides::default()
                },
                &state.rules,
                &mut state.rng,
            );
            ids.push(agent.id);
            state.world.add_agent(agent);
        }
        (state, ids)
    }

    fn idle() -> ScriptedDecisionSource {
        ScriptedDecisionSource::new(DecisionOutcome::Calls {
            calls: Vec::new(),
            telemetry: None,
        })
    }

    #[tokio::test]
    async fn clock_advances_and_day_flag_follows() {
        let (mut state, _) = state_with(&[]);
        for _ in 0..6 {
            run_tick(&mut state, &LocalDecisionSource::new()).await;
        }
        assert_eq!(state.world.tick, 6);
        assert!(state.world.is_day);
    }

    #[tokio::test]
    async fn child_grows_up_with_status_event() {
        let (mut state, ids) = state_with(&[(Gender::Male, 239, Position::new(1, 1))]);
        let id = *ids.first().unwrap();
        run_tick(&mut state, &idle()).await;
        assert_eq!(state.world.agent(id).unwrap().status, LifeStage::Adult);
        let first = state.log.events().first().unwrap();
        assert_eq!(first.event_type, EventType::StatusChange);
    }

    #[tokio::test]
    async fn elder_death_drops_inventory_before_death_event() {
        let (mut state, ids) = state_with(&[(Gender::Male, 2000, Position::new(3, 3))]);
        state.rules.elder_death_chance = 1.0;
        let id = *ids.first().unwrap();
        state.world.agent_mut(id).unwrap().inventory = BTreeMap::from([(Resource::Wood, 2)]);

        let summary = run_tick(&mut state, &LocalDecisionSource::new()).await;
        assert_eq!(summary.deaths.len(), 1);
        assert!(state.world.agent(id).is_none());
        let types: Vec<EventType> = state.log.events().iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::ResourceDrop, EventType::Death]);
        assert_eq!(state.world.pile_contents(Position::new(3, 3)).get(&Resource::Wood), Some(&2));
    }

    #[tokio::test]
    async fn empty_answer_logs_decision_error() {
        let (mut state, ids) = state_with(&[(Gender::Female, 300, Position::new(2, 2))]);
        let summary = run_tick(&mut state, &idle()).await;
        assert_eq!(summary.decision_errors, 1);
        let event = state.log.events().last().unwrap();
        assert_eq!(event.event_type, EventType::DecisionError);
        assert_eq!(event.agents, ids);
    }

    #[tokio::test]
    async fn unknown_action_is_logged_and_dropped() {
        let (mut state, ids) = state_with(&[(Gender::Female, 300, Position::new(2, 2))]);
        let id = *ids.first().unwrap();
        let source = idle().with(
            id,
            DecisionOutcome::Calls {
                calls: vec![DecidedCall::Unknown {
                    name: String::from("fly"),
                }],
                telemetry: None,
            },
        );
        run_tick(&mut state, &source).await;
        let event = state.log.events().last().unwrap();
        assert!(matches!(&event.details, EventDetails::DecisionError { reason } if reason.contains("fly")));
        assert_eq!(state.world.agent(id).unwrap().location, Position::new(2, 2));
    }

    #[tokio::test]
    async fn unavailable_source_falls_back_locally() {
        let (mut state, ids) = state_with(&[(Gender::Female, 300, Position::new(2, 2))]);
        let source = ScriptedDecisionSource::new(DecisionOutcome::Unavailable {
            reason: String::from("connection refused"),
        });
        let summary = run_tick(&mut state, &source).await;
        assert_eq!(summary.fallbacks, 1);
        let types: Vec<EventType> = state.log.events().iter().map(|e| e.event_type).collect();
        // Alone on free grass, the heuristic plants.
        assert_eq!(types, vec![EventType::DecisionFallback, EventType::CreateCropField]);
        assert_eq!(state.log.events().first().unwrap().agents, ids);
    }

    #[tokio::test]
    async fn invalid_actions_leave_no_trace() {
        let (mut state, ids) = state_with(&[(Gender::Female, 300, Position::new(2, 2))]);
        let id = *ids.first().unwrap();
        let source = idle().with(
            id,
            DecisionOutcome::Calls {
                calls: vec![DecidedCall::Known(ActionCall::Move {
                    to: Position::new(6, 6),
                })],
                telemetry: None,
            },
        );
        let before = state.world.clone();
        let summary = run_tick(&mut state, &source).await;
        assert_eq!(summary.actions_skipped, 1);
        assert!(state.log.is_empty());
        assert_eq!(state.world.agent(id).unwrap().location, before.agent(id).unwrap().location);
    }

    #[tokio::test]
    async fn only_first_call_is_used() {
        let (mut state, ids) = state_with(&[(Gender::Female, 300, Position::new(2, 2))]);
        let id = *ids.first().unwrap();
        let source = idle().with(
            id,
            DecisionOutcome::Calls {
                calls: vec![
                    DecidedCall::Known(ActionCall::Move {
                        to: Position::new(3, 2),
                    }),
                    DecidedCall::Known(ActionCall::Move {
                        to: Position::new(4, 2),
                    }),
                ],
                telemetry: None,
            },
        );
        let summary = run_tick(&mut state, &source).await;
        assert_eq!(summary.actions_applied, 1);
        assert_eq!(state.world.agent(id).unwrap().location, Position::new(3, 2));
    }

    #[tokio::test]
    async fn certain_weather_change_is_logged() {
        let (mut state, _) = state_with(&[]);
        state.settings.weather_change_chance = 1.0;
        run_tick(&mut state, &LocalDecisionSource::new()).await;
        assert_eq!(state.world.weather, Weather::Rain);
        let event = state.log.events().last().unwrap();
        assert_eq!(event.event_type, EventType::WeatherChange);
        assert!(event.agents.is_empty());
    }
}
