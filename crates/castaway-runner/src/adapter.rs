//! The LLM-backed [`DecisionSource`].
//!
//! For each request the adapter renders the prompt, picks the tool schema
//! for the agent's life stage, and asks the backend. Two budgets apply:
//!
//! - **Transport**: a failed or timed-out attempt is retried with
//!   exponential backoff up to `transport_attempts` in total. Non-retryable
//!   failures (bad key, bad request) end the budget at once. Running out
//!   yields [`DecisionOutcome::Unavailable`] and the engine falls back to
//!   its local heuristic.
//! - **Empty answers**: a response with no usable tool call is asked again
//!   up to `empty_retries` more times. Running out yields
//!   [`DecisionOutcome::Exhausted`] and the agent skips its turn.

use std::time::Duration;

use castaway_core::{DecisionOutcome, DecisionRequest, DecisionSource, DecisionTelemetry};
use castaway_types::AgentId;
use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{AdapterConfig, RetryPolicy};
use crate::error::LlmError;
use crate::llm::{Completion, LlmBackend, create_backend};
use crate::parse;
use crate::prompt::{PromptEngine, RenderedPrompt};
use crate::schema::{self, ToolSpec};

/// Decision source that asks an LLM through a tool-calling API.
#[derive(Debug)]
pub struct LlmDecisionSource {
    backend: LlmBackend,
    prompts: PromptEngine,
    policy: RetryPolicy,
}

/// A successful response and what it took to get it.
struct Answered {
    completion: Completion,
    latency: Duration,
}

impl LlmDecisionSource {
    /// Assemble a source from its parts.
    pub const fn new(backend: LlmBackend, prompts: PromptEngine, policy: RetryPolicy) -> Self {
        Self {
            backend,
            prompts,
            policy,
        }
    }

    /// Build the backend and prompt engine described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the HTTP client cannot be built or the
    /// templates cannot be loaded.
    pub fn from_config(config: &AdapterConfig) -> Result<Self, LlmError> {
        let backend = create_backend(&config.backend)?;
        let prompts = PromptEngine::new(config.templates_dir.as_deref())?;
        Ok(Self::new(backend, prompts, config.retry))
    }

    /// One request, retried on transport failure with exponential backoff.
    async fn request_with_backoff(
        &self,
        agent_id: AgentId,
        prompt: &RenderedPrompt,
        tools: &[ToolSpec],
        attempts: &mut u32,
    ) -> Result<Answered, LlmError> {
        let mut failures: u32 = 0;
        loop {
            *attempts = attempts.saturating_add(1);
            let started = Instant::now();
            let result = match tokio::time::timeout(self.policy.request_timeout, self.backend.complete(prompt, tools)).await
            {
                Ok(result) => result,
                Err(_elapsed) => Err(LlmError::Timeout {
                    ms: u64::try_from(self.policy.request_timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            let error = match result {
                Ok(completion) => {
                    return Ok(Answered {
                        completion,
                        latency: started.elapsed(),
                    });
                }
                Err(error) => error,
            };

            failures = failures.saturating_add(1);
            if !error.is_retryable() || failures >= self.policy.transport_attempts {
                return Err(error);
            }
            let delay = self.policy.backoff(failures.saturating_sub(1));
            debug!(
                agent_id = %agent_id,
                attempt = failures,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "LLM request failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl DecisionSource for LlmDecisionSource {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn decide(&self, request: DecisionRequest) -> DecisionOutcome {
        let agent_id = request.agent_id;
        let prompt = match self.prompts.render(&request.perception) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "prompt rendering failed");
                return DecisionOutcome::Unavailable { reason: e.to_string() };
            }
        };
        let tools = schema::tools_for(request.status);

        let mut attempts: u32 = 0;
        let mut empty_answers: u32 = 0;
        let mut prompt_tokens: u32 = 0;
        let mut completion_tokens: u32 = 0;

        loop {
            let answered = match self.request_with_backoff(agent_id, &prompt, &tools, &mut attempts).await {
                Ok(answered) => answered,
                Err(e) => {
                    warn!(agent_id = %agent_id, attempts, error = %e, "LLM unavailable");
                    return DecisionOutcome::Unavailable { reason: e.to_string() };
                }
            };
            prompt_tokens = prompt_tokens.saturating_add(answered.completion.prompt_tokens);
            completion_tokens = completion_tokens.saturating_add(answered.completion.completion_tokens);

            let calls = parse::parse_calls(&answered.completion.calls);
            if !calls.is_empty() {
                let telemetry = DecisionTelemetry {
                    backend: self.backend.name().to_owned(),
                    model: self.backend.model().to_owned(),
                    prompt_tokens,
                    completion_tokens,
                    latency_ms: u64::try_from(answered.latency.as_millis()).unwrap_or(u64::MAX),
                    attempts,
                    received_at: Utc::now(),
                };
                return DecisionOutcome::Calls {
                    calls,
                    telemetry: Some(telemetry),
                };
            }

            if empty_answers >= self.policy.empty_retries {
                let responses = empty_answers.saturating_add(1);
                return DecisionOutcome::Exhausted {
                    reason: format!("{} gave no usable action in {responses} responses", self.backend.name()),
                };
            }
            empty_answers = empty_answers.saturating_add(1);
            debug!(agent_id = %agent_id, empty_answers, "empty answer, asking again");
        }
    }
}
