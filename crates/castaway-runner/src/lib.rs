//! LLM decision source for the Castaway simulation.
//!
//! Implements [`castaway_core::DecisionSource`] on top of tool-calling chat
//! APIs. Each agent's perception is rendered through `minijinja` templates,
//! the actions it may take are offered as tools, and the returned tool
//! calls are repaired and parsed into typed action calls.
//!
//! # Modules
//!
//! - [`adapter`] -- [`LlmDecisionSource`] with transport and empty-answer
//!   retry budgets.
//! - [`config`] -- Adapter settings derived from the `llm` and `decision`
//!   config sections.
//! - [`error`] -- [`LlmError`].
//! - [`llm`] -- `OpenAI`-compatible and Anthropic HTTP backends.
//! - [`parse`] -- Tool-call repair and parsing.
//! - [`prompt`] -- Template loading and rendering.
//! - [`schema`] -- Tool definitions per life stage.

pub mod adapter;
pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod schema;

pub use adapter::LlmDecisionSource;
pub use config::{AdapterConfig, BackendType, LlmBackendConfig, RetryPolicy};
pub use error::LlmError;
pub use llm::{Completion, LlmBackend, create_backend};
pub use parse::{RawToolCall, parse_calls};
pub use prompt::{PromptEngine, RenderedPrompt};
pub use schema::{ToolSpec, tools_for};
