//! Configuration types for the LLM decision source.
//!
//! Everything comes from the `llm` and `decision` sections of
//! `castaway-config.yaml` (see [`castaway_core::config`]); this module turns
//! those loosely-typed sections into the backend selection and retry policy
//! the adapter works with.

use std::time::Duration;

use castaway_core::config::{DecisionConfig, LlmConfig};

use crate::error::LlmError;

/// Complete adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Which API to call and how.
    pub backend: LlmBackendConfig,
    /// Retry and timeout budget.
    pub retry: RetryPolicy,
    /// Directory with prompt template overrides.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key. Local OpenAI-compatible servers often need none.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Completion token cap per request.
    pub max_tokens: u32,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions with `tools` (works with
    /// `OpenAI`, `DeepSeek`, Ollama, vLLM).
    OpenAi,
    /// Anthropic Messages API with tool use.
    Anthropic,
}

impl BackendType {
    /// Parse the configured backend name.
    pub fn parse(name: &str) -> Result<Self, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" | "vllm" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(LlmError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

/// How hard the adapter tries before giving up on one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra requests after a response with no usable call.
    pub empty_retries: u32,
    /// Total attempts per request on transport failure.
    pub transport_attempts: u32,
    /// First backoff delay. Doubles after every failed attempt.
    pub backoff_base: Duration,
    /// Deadline for a single attempt.
    pub request_timeout: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

impl From<&DecisionConfig> for RetryPolicy {
    fn from(config: &DecisionConfig) -> Self {
        Self {
            empty_retries: config.empty_retries,
            transport_attempts: config.transport_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

impl AdapterConfig {
    /// Build the adapter configuration from the simulation config sections.
    ///
    /// The Anthropic backend requires an API key; `OpenAI`-compatible
    /// servers may run without one.
    pub fn from_sections(llm: &LlmConfig, decision: &DecisionConfig) -> Result<Self, LlmError> {
        let backend_type = BackendType::parse(&llm.backend)?;
        let api_key = llm.api_key.clone().filter(|k| !k.trim().is_empty());
        if backend_type == BackendType::Anthropic && api_key.is_none() {
            return Err(LlmError::Config(String::from(
                "the anthropic backend needs an API key (set CASTAWAY_LLM_API_KEY)",
            )));
        }
        if llm.api_url.trim().is_empty() {
            return Err(LlmError::Config(String::from("llm.api_url is empty")));
        }

        Ok(Self {
            backend: LlmBackendConfig {
                backend_type,
                api_url: llm.api_url.trim_end_matches('/').to_owned(),
                api_key,
                model: llm.model.clone(),
                max_tokens: llm.max_tokens,
            },
            retry: RetryPolicy::from(decision),
            templates_dir: llm.templates_dir.clone(),
        })
    }
}
