//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the run itself, and
//! the final save, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: castaway_core::ConfigError,
    },

    /// Island generation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: castaway_world::WorldError,
    },

    /// The LLM decision source could not be built.
    #[error("decision source error: {source}")]
    Llm {
        /// The underlying adapter error.
        #[from]
        source: castaway_runner::LlmError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: castaway_core::RunnerError,
    },

    /// Saving or loading a timeline failed.
    #[error("persistence error: {source}")]
    Persist {
        /// The underlying persistence error.
        #[from]
        source: castaway_core::PersistError,
    },

    /// Agent spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
