//! Saving and loading a whole timeline as one JSON document.
//!
//! A [`SavedTimeline`] holds the live world, every event, every snapshot,
//! the id mint, and the seed. Loading rebuilds a [`SimulationState`] whose
//! random stream is derived from the seed and the saved tick (see
//! [`SimRng::resumed`]).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use castaway_agents::AgentRules;
use castaway_types::{Event, EventId, IdMint};
use castaway_world::{SimRng, World};

use crate::event_log::EventLog;
use crate::tick::{SimulationState, TickSettings};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors from saving or loading a timeline.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Failed to read or write the file.
    #[error("failed to access save file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to encode or decode JSON.
    #[error("failed to encode or decode timeline: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The file was written by an incompatible version.
    #[error("unsupported save format version {found}")]
    Version {
        /// The version found in the file.
        found: u32,
    },
}

/// Everything needed to continue a run later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTimeline {
    /// Format version of this document.
    pub format_version: u32,
    /// When the save was written.
    pub saved_at: DateTime<Utc>,
    /// Seed of the original run.
    pub seed: u64,
    /// World tick at save time.
    pub tick: u64,
    /// The live world.
    pub world: World,
    /// Events, oldest first.
    pub events: Vec<Event>,
    /// World snapshots keyed by event id.
    pub snapshots: BTreeMap<EventId, World>,
    /// Id mint position, so resumed runs never reuse an id.
    pub mint: IdMint,
}

impl SavedTimeline {
    /// Capture `state`.
    pub fn capture(state: &SimulationState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            seed: state.rng.seed(),
            tick: state.world.tick,
            world: state.world.clone(),
            events: state.log.events().to_vec(),
            snapshots: state.log.snapshots().clone(),
            mint: state.mint.clone(),
        }
    }

    /// Rebuild engine state with the given rules and settings.
    pub fn restore(self, rules: AgentRules, settings: TickSettings) -> SimulationState {
        SimulationState {
            rng: SimRng::resumed(self.seed, self.tick),
            world: self.world,
            mint: self.mint,
            log: EventLog::from_parts(self.events, self.snapshots),
            rules,
            settings,
        }
    }
}

/// Write `state` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding or writing fails.
pub fn save(path: &Path, state: &SimulationState) -> Result<(), PersistError> {
    let saved = SavedTimeline::capture(state);
    let json = serde_json::to_string_pretty(&saved)?;
    std::fs::write(path, json)?;
    info!(
        path = %path.display(),
        tick = saved.tick,
        events = saved.events.len(),
        "timeline saved"
    );
    Ok(())
}

/// Read a timeline from `path`.
///
/// # Errors
///
/// Returns [`PersistError`] if the file cannot be read or decoded, or was
/// written in another format version.
pub fn load(path: &Path) -> Result<SavedTimeline, PersistError> {
    let contents = std::fs::read_to_string(path)?;
    let saved: SavedTimeline = serde_json::from_str(&contents)?;
    if saved.format_version != FORMAT_VERSION {
        return Err(PersistError::Version {
            found: saved.format_version,
        });
    }
    info!(
        path = %path.display(),
        tick = saved.tick,
        events = saved.events.len(),
        saved_at = %saved.saved_at,
        "timeline loaded"
    );
    Ok(saved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_agents::{AgentOverrides, create_agent};
    use castaway_types::{Gender, Position, Terrain};
    use castaway_world::{UniformGenerator, generate_world};

    use super::*;
    use crate::decision::LocalDecisionSource;
    use crate::tick::run_tick;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("castaway-{name}-{}.json", std::process::id()))
    }

    async fn played_state() -> SimulationState {
        let generator = UniformGenerator {
            terrain: Terrain::Grass,
            with_resources: true,
        };
        let world = generate_world(&generator, 8, 8, &mut SimRng::new(2)).unwrap();
        let mut state = SimulationState::new(world, 2, AgentRules::default(), TickSettings::default());
        for (i, gender) in [Gender::Female, Gender::Male].into_iter().enumerate() {
            let x = i32::try_from(i).unwrap();
            let agent = create_agent(
                state.mint.mint(),
                AgentOverrides {
                    gender: Some(gender),
                    age: Some(300),
                    location: Some(Position::new(x, 0)),
                    ..AgentOverrides::default()
                },
                &state.rules,
                &mut state.rng,
            );
            state.world.add_agent(agent);
        }
        for _ in 0..4 {
            run_tick(&mut state, &LocalDecisionSource::new()).await;
        }
        state
    }

    #[tokio::test]
    async fn save_then_load_restores_everything() {
        let state = played_state().await;
        let path = temp_path("roundtrip");
        save(&path, &state).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.world, state.world);
        assert_eq!(loaded.events, state.log.events());
        assert_eq!(&loaded.snapshots, state.log.snapshots());

        let restored = loaded.restore(AgentRules::default(), TickSettings::default());
        assert_eq!(restored.mint, state.mint);
        assert_eq!(restored.log.len(), state.log.len());
    }

    #[tokio::test]
    async fn wrong_version_is_rejected() {
        let state = played_state().await;
        let mut saved = SavedTimeline::capture(&state);
        saved.format_version = FORMAT_VERSION.saturating_add(1);
        let path = temp_path("version");
        std::fs::write(&path, serde_json::to_string(&saved).unwrap()).unwrap();
        let result = load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(PersistError::Version { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(PersistError::Io { .. })));
    }
}
