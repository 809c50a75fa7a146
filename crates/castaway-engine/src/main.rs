//! Engine binary for the Castaway simulation.
//!
//! Wires together island generation, the seed population, the decision
//! source, and operator controls, then runs the tick loop until the tick
//! limit, extinction, or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `castaway-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Generate the island and spawn seed agents, or restore the saved
//!    timeline passed as the first argument
//! 4. Create the decision source (LLM when `llm.enabled`, else local)
//! 5. Create operator state and the Ctrl-C handler
//! 6. Run the simulation loop
//! 7. Log the result and save the timeline to `simulation.save_path`

mod error;
mod report;
mod spawner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use castaway_core::config::{LoggingConfig, SimulationConfig};
use castaway_core::{
    DecisionSource, LocalDecisionSource, OperatorState, Simulation, SimulationState, TickSettings, persist,
    run_simulation, runner,
};
use castaway_runner::{AdapterConfig, LlmDecisionSource};
use castaway_world::{IslandGenerator, SimRng, generate_world};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report::ChronicleCallback;
use crate::spawner::SpawnerConfig;

const CONFIG_PATH: &str = "castaway-config.yaml";

/// Stream id for island generation. Ticks never reach it, so neither the
/// tick stream nor a resumed one replays the terrain draws.
const TERRAIN_STREAM: u64 = u64::MAX;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step, the simulation itself, or
/// the final save fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        tick_interval_ms = config.world.tick_interval_ms,
        "castaway-engine starting"
    );

    // 3. Fresh island or restored timeline.
    let state = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => restore_state(&path, &config)?,
        None => fresh_state(&config)?,
    };
    info!(
        tick = state.world.tick,
        agents_alive = state.world.living_agents().count(),
        events = state.log.len(),
        "simulation state assembled"
    );

    // 4. Operator state and Ctrl-C.
    let operator = Arc::new(OperatorState::new(config.world.tick_interval_ms, &config.simulation));
    spawn_interrupt_handler(Arc::clone(&operator));
    info!(
        max_ticks = ?operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        started_at = %operator.started_at(),
        "operator state initialized"
    );

    // 5-7. Decision source, run, save.
    let save_path = config.simulation.save_path.as_deref().map(Path::new);
    if config.llm.enabled {
        let adapter_config = AdapterConfig::from_sections(&config.llm, &config.decision)?;
        let source = LlmDecisionSource::from_config(&adapter_config)?;
        info!(
            backend = source.name(),
            model = adapter_config.backend.model,
            transport_attempts = adapter_config.retry.transport_attempts,
            empty_retries = adapter_config.retry.empty_retries,
            "LLM decision source ready"
        );
        run(state, source, &operator, save_path).await?;
    } else {
        info!("LLM disabled, agents decide with the local heuristic");
        run(state, LocalDecisionSource, &operator, save_path).await?;
    }

    info!("castaway-engine shutdown complete");
    Ok(())
}

/// Run the loop to completion, then save if a path is configured.
async fn run<D: DecisionSource>(
    state: SimulationState,
    source: D,
    operator: &Arc<OperatorState>,
    save_path: Option<&Path>,
) -> Result<(), EngineError> {
    let mut sim = Simulation::new(state, source);
    let mut chronicle = ChronicleCallback::new();

    let result = run_simulation(&mut sim, operator, &mut chronicle).await?;
    runner::log_simulation_end(&result);
    let days = chronicle.finish();
    info!(days = days.len(), events = sim.log().len(), "chronicle closed");

    if let Some(path) = save_path {
        let (state, _source) = sim.into_parts();
        persist::save(path, &state)?;
    }
    Ok(())
}

/// Load `castaway-config.yaml` from the working directory, or defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }
}

/// Load the `agents` section of `castaway-config.yaml`.
///
/// Missing file or missing section means defaults.
fn load_spawner_config() -> Result<SpawnerConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(SpawnerConfig::default());
    }
    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Spawner {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Spawner {
        message: format!("failed to parse config YAML: {e}"),
    })?;
    match raw.get("agents") {
        Some(section) => serde_yml::from_value(section.clone()).map_err(|e| EngineError::Spawner {
            message: format!("failed to parse agents config: {e}"),
        }),
        None => Ok(SpawnerConfig::default()),
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Generate the island and populate it.
fn fresh_state(config: &SimulationConfig) -> Result<SimulationState, EngineError> {
    let mut terrain_rng = SimRng::derived(config.world.seed, TERRAIN_STREAM);
    let world = generate_world(
        &IslandGenerator::default(),
        config.world.width,
        config.world.height,
        &mut terrain_rng,
    )?;
    let mut state = SimulationState::from_config(world, config);

    let spawner_config = load_spawner_config()?;
    spawner::spawn_seed_agents(&mut state, config.population.initial_agents, &spawner_config)?;
    Ok(state)
}

/// Restore a saved timeline, taking rules and tunables from the current
/// configuration.
fn restore_state(path: &Path, config: &SimulationConfig) -> Result<SimulationState, EngineError> {
    let saved = persist::load(path)?;
    if saved.seed != config.world.seed {
        warn!(
            saved_seed = saved.seed,
            config_seed = config.world.seed,
            "saved timeline was run with another seed, continuing with the saved one"
        );
    }
    info!(path = %path.display(), tick = saved.tick, "resuming saved timeline");
    let settings = TickSettings {
        weather_change_chance: config.environment.weather_change_chance,
        batch_size: config.decision.batch_size,
    };
    Ok(saved.restore(config.to_rules(), settings))
}

/// Request a clean stop on Ctrl-C.
fn spawn_interrupt_handler(operator: Arc<OperatorState>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping after the current tick");
                operator.request_stop();
            }
            Err(e) => warn!(error = %e, "could not listen for Ctrl-C"),
        }
    });
}
