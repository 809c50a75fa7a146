//! Decision source trait and in-process implementations.
//!
//! During action dispatch the tick engine presents each agent's
//! [`Perception`] to a [`DecisionSource`] and awaits a [`DecisionOutcome`].
//! The trait abstracts the mechanism: an LLM backend (`castaway-runner`),
//! a scripted source for tests and replays, or the built-in local
//! heuristic.
//!
//! A source never fails: every failure mode is folded into an outcome the
//! engine knows how to log.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use castaway_types::{AgentId, DecidedCall, LifeStage, Perception};

/// Everything a source needs to decide for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// The deciding agent.
    pub agent_id: AgentId,
    /// Lifecycle stage; selects the action schema.
    pub status: LifeStage,
    /// Bounded view of the agent and its surroundings.
    pub perception: Perception,
}

/// Token usage and latency reported by a remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTelemetry {
    /// Backend name.
    pub backend: String,
    /// Model name.
    pub model: String,
    /// Prompt tokens consumed.
    pub prompt_tokens: u32,
    /// Completion tokens produced.
    pub completion_tokens: u32,
    /// Wall-clock latency of the successful attempt.
    pub latency_ms: u64,
    /// Requests issued, including retries.
    pub attempts: u32,
    /// When the answer arrived.
    pub received_at: DateTime<Utc>,
}

/// The result of asking a source for one agent's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Zero or more calls. Only the first is used.
    Calls {
        /// Calls in the order the source returned them.
        calls: Vec<DecidedCall>,
        /// Usage telemetry, if the source reports it.
        telemetry: Option<DecisionTelemetry>,
    },
    /// The source kept answering with nothing. Logged as a decision error;
    /// the agent skips its turn.
    Exhausted {
        /// Why the budget ran out.
        reason: String,
    },
    /// The source could not be reached. Logged as a fallback; the agent
    /// uses the local heuristic.
    Unavailable {
        /// Last transport error.
        reason: String,
    },
    /// The source defers to the local heuristic without any event.
    Local,
}

/// A source of agent decisions.
///
/// Requests for one batch are awaited concurrently, so implementations
/// must be shareable across tasks. Timeouts and retries belong to the
/// implementation: the engine awaits whatever it returns.
pub trait DecisionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Decide one agent's action for this tick.
    fn decide(&self, request: DecisionRequest) -> impl Future<Output = DecisionOutcome> + Send;
}

/// A source that always defers to the built-in heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDecisionSource;

impl LocalDecisionSource {
    /// Create a new local decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for LocalDecisionSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn decide(&self, _request: DecisionRequest) -> DecisionOutcome {
        DecisionOutcome::Local
    }
}

/// A source that replays queued outcomes per agent.
///
/// Each agent's queue is consumed front to back; once it is empty the
/// fallback outcome is returned. Two runs fed the same script produce the
/// same answers regardless of request ordering.
#[derive(Debug)]
pub struct ScriptedDecisionSource {
    queues: Mutex<BTreeMap<AgentId, VecDeque<DecisionOutcome>>>,
    fallback: DecisionOutcome,
}

impl ScriptedDecisionSource {
    /// A script with no entries answering `fallback` for everyone.
    pub fn new(fallback: DecisionOutcome) -> Self {
        Self {
            queues: Mutex::new(BTreeMap::new()),
            fallback,
        }
    }

    /// Queue `outcome` for `agent` while the script is exclusively owned.
    #[must_use]
    pub fn with(mut self, agent: AgentId, outcome: DecisionOutcome) -> Self {
        self.queues.get_mut().entry(agent).or_default().push_back(outcome);
        self
    }

    /// Outcomes still queued across all agents.
    pub async fn remaining(&self) -> usize {
        self.queues.lock().await.values().map(VecDeque::len).sum()
    }
}

impl DecisionSource for ScriptedDecisionSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn decide(&self, request: DecisionRequest) -> DecisionOutcome {
        self.queues
            .lock()
            .await
            .get_mut(&request.agent_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone())
    }
}
