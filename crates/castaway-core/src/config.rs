//! Configuration loading and typed config structures for Castaway.
//!
//! The canonical configuration lives in `castaway-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file and applies environment
//! overrides. Every field has a default, so an empty file is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use castaway_agents::AgentRules;

/// Environment variable overriding `world.seed`.
pub const ENV_SEED: &str = "CASTAWAY_SEED";
/// Environment variable overriding `llm.api_key`.
pub const ENV_LLM_API_KEY: &str = "CASTAWAY_LLM_API_KEY";
/// Environment variable overriding `llm.api_url`.
pub const ENV_LLM_API_URL: &str = "CASTAWAY_LLM_API_URL";
/// Environment variable overriding `llm.model`.
pub const ENV_LLM_MODEL: &str = "CASTAWAY_LLM_MODEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {name}: {source}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseIntError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `castaway-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed, timing, and map size.
    #[serde(default)]
    pub world: WorldConfig,

    /// Lifecycle, nutrition, and movement rules.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Crop rules.
    #[serde(default)]
    pub farming: FarmingConfig,

    /// Weather.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Memory bounds.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Decision dispatch and retry budget.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Decision service connection.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Run bounds and persistence.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CASTAWAY_SEED` overrides `world.seed`
    /// - `CASTAWAY_LLM_API_KEY` overrides `llm.api_key`
    /// - `CASTAWAY_LLM_API_URL` overrides `llm.api_url`
    /// - `CASTAWAY_LLM_MODEL` overrides `llm.model`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if `CASTAWAY_SEED` is not a number.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value if set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_SEED) {
            self.world.seed = raw.trim().parse().map_err(|source| ConfigError::InvalidOverride {
                name: ENV_SEED,
                value: raw.clone(),
                source,
            })?;
        }
        if let Some(key) = lookup(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_LLM_API_URL) {
            self.llm.api_url = url;
        }
        if let Some(model) = lookup(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        Ok(())
    }

    /// The agent rule set derived from this configuration.
    pub fn to_rules(&self) -> AgentRules {
        AgentRules {
            child_duration: self.population.child_duration,
            elder_age: self.population.elder_age,
            elder_death_chance: self.population.elder_death_chance,
            pregnancy_duration: self.population.pregnancy_duration,
            crop_growth_time: self.farming.crop_growth_time,
            crop_watering_required: self.farming.crop_watering_required,
            harvest_yield: self.farming.harvest_yield,
            move_distance: self.population.move_distance,
            meals_per_day: self.population.meals_per_day,
            visibility_radius: self.population.visibility_radius,
            memory_limit: self.memory.memory_limit,
            conversation_limit: self.memory.conversation_limit,
            spatial_top_n: self.memory.spatial_top_n,
            spatial_dedup_radius: self.memory.spatial_dedup_radius,
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks in the run loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Map width in tiles.
    #[serde(default = "default_map_size")]
    pub width: u32,

    /// Map height in tiles.
    #[serde(default = "default_map_size")]
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            width: default_map_size(),
            height: default_map_size(),
        }
    }
}

/// Population and per-agent rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents spawned at simulation start.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Age at which a child becomes an adult.
    #[serde(default = "default_child_duration")]
    pub child_duration: u64,

    /// Age at which an adult becomes an elder.
    #[serde(default = "default_elder_age")]
    pub elder_age: u64,

    /// Per-tick elder death probability.
    #[serde(default = "default_elder_death_chance")]
    pub elder_death_chance: f64,

    /// Ticks from conception to birth.
    #[serde(default = "default_pregnancy_duration")]
    pub pregnancy_duration: u64,

    /// Meals required per 24-tick day.
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u32,

    /// Maximum Chebyshev distance of one move.
    #[serde(default = "default_move_distance")]
    pub move_distance: u32,

    /// Default visibility radius.
    #[serde(default = "default_visibility_radius")]
    pub visibility_radius: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            child_duration: default_child_duration(),
            elder_age: default_elder_age(),
            elder_death_chance: default_elder_death_chance(),
            pregnancy_duration: default_pregnancy_duration(),
            meals_per_day: default_meals_per_day(),
            move_distance: default_move_distance(),
            visibility_radius: default_visibility_radius(),
        }
    }
}

/// Crop rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingConfig {
    /// Ticks from planting to maturity.
    #[serde(default = "default_crop_growth_time")]
    pub crop_growth_time: u64,

    /// Rain waterings required before a harvest.
    #[serde(default = "default_crop_watering_required")]
    pub crop_watering_required: u32,

    /// Food granted per harvest.
    #[serde(default = "default_harvest_yield")]
    pub harvest_yield: u32,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            crop_growth_time: default_crop_growth_time(),
            crop_watering_required: default_crop_watering_required(),
            harvest_yield: default_harvest_yield(),
        }
    }
}

/// Environment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Per-tick probability that the weather toggles.
    #[serde(default = "default_weather_change_chance")]
    pub weather_change_chance: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            weather_change_chance: default_weather_change_chance(),
        }
    }
}

/// Memory bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Memory entries kept per agent.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,

    /// Conversation lines kept per partner.
    #[serde(default = "default_conversation_limit")]
    pub conversation_limit: usize,

    /// Spatial memories kept per category.
    #[serde(default = "default_spatial_top_n")]
    pub spatial_top_n: usize,

    /// Manhattan radius within which same-category spatial memories merge.
    #[serde(default = "default_spatial_dedup_radius")]
    pub spatial_dedup_radius: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_limit: default_memory_limit(),
            conversation_limit: default_conversation_limit(),
            spatial_top_n: default_spatial_top_n(),
            spatial_dedup_radius: default_spatial_dedup_radius(),
        }
    }
}

/// Decision dispatch and the adapter's retry budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Decision requests in flight at once.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Extra requests after an empty answer.
    #[serde(default = "default_empty_retries")]
    pub empty_retries: u32,

    /// Total attempts on transport failure.
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: u32,

    /// First backoff delay; doubles on every retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Per-attempt timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            empty_retries: default_empty_retries(),
            transport_attempts: default_transport_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Decision service connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether to call the service at all. Without it every agent uses the
    /// local heuristic.
    #[serde(default)]
    pub enabled: bool,

    /// `openai` (chat completions with tool calls) or `anthropic`
    /// (messages with tool use).
    #[serde(default = "default_llm_backend")]
    pub backend: String,

    /// Base URL of the API.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// API key. Usually supplied through `CASTAWAY_LLM_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Maximum tokens per completion.
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Directory holding prompt templates. Built-in templates are used when
    /// unset.
    #[serde(default)]
    pub templates_dir: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: default_llm_backend(),
            api_url: default_llm_api_url(),
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            templates_dir: None,
        }
    }
}

/// Run bounds and save location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks. Unbounded when unset.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Where to write the timeline on shutdown. Nothing is saved when unset.
    #[serde(default)]
    pub save_path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Castaway")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_map_size() -> u32 {
    64
}

const fn default_initial_agents() -> u32 {
    8
}

const fn default_child_duration() -> u64 {
    240
}

const fn default_elder_age() -> u64 {
    1440
}

const fn default_elder_death_chance() -> f64 {
    0.01
}

const fn default_pregnancy_duration() -> u64 {
    72
}

const fn default_meals_per_day() -> u32 {
    3
}

const fn default_move_distance() -> u32 {
    1
}

const fn default_visibility_radius() -> u32 {
    5
}

const fn default_crop_growth_time() -> u64 {
    72
}

const fn default_crop_watering_required() -> u32 {
    3
}

const fn default_harvest_yield() -> u32 {
    5
}

const fn default_weather_change_chance() -> f64 {
    0.05
}

const fn default_memory_limit() -> usize {
    50
}

const fn default_conversation_limit() -> usize {
    10
}

const fn default_spatial_top_n() -> usize {
    5
}

const fn default_spatial_dedup_radius() -> u32 {
    8
}

const fn default_batch_size() -> usize {
    5
}

const fn default_empty_retries() -> u32 {
    2
}

const fn default_transport_attempts() -> u32 {
    3
}

const fn default_backoff_base_ms() -> u64 {
    250
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_llm_backend() -> String {
    String::from("openai")
}

fn default_llm_api_url() -> String {
    String::from("https://api.openai.com/v1")
}

fn default_llm_model() -> String {
    String::from("gpt-4o-mini")
}

const fn default_llm_max_tokens() -> u32 {
    512
}

fn default_log_level() -> String {
    String::from("info")
}
