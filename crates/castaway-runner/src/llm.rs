//! LLM backend abstraction and implementations.
//!
//! Defines an enum-based dispatch for LLM backends, avoiding the
//! dyn-compatibility issues with async trait methods. Concrete
//! implementations exist for `OpenAI`-compatible chat completions with
//! `tools` and the Anthropic Messages API with tool use. All backends
//! communicate over HTTP via `reqwest`.
//!
//! A backend sends one request and returns whatever tool calls came back,
//! plus token usage. Retries, timeouts, and parsing live elsewhere.

use serde_json::{Value, json};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::LlmError;
use crate::parse::RawToolCall;
use crate::prompt::RenderedPrompt;
use crate::schema::ToolSpec;

/// What one request produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Tool calls in the order the model emitted them.
    pub calls: Vec<RawToolCall>,
    /// Prompt tokens reported by the API.
    pub prompt_tokens: u32,
    /// Completion tokens reported by the API.
    pub completion_tokens: u32,
}

// ---------------------------------------------------------------------------
// Unified backend enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// An LLM backend that can answer a prompt with tool calls.
#[derive(Debug)]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Send a prompt with the given tools and return the tool calls.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Transport`] or [`LlmError::Status`] if the HTTP
    /// call fails, or [`LlmError::Response`] if the body has the wrong
    /// shape.
    pub async fn complete(&self, prompt: &RenderedPrompt, tools: &[ToolSpec]) -> Result<Completion, LlmError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt, tools).await,
            Self::Anthropic(backend) => backend.complete(prompt, tools).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(backend) => &backend.config.model,
            Self::Anthropic(backend) => &backend.config.model,
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, Ollama, and vLLM endpoints.
/// Sends requests to `{api_url}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: LlmBackendConfig,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub const fn new(client: reqwest::Client, config: LlmBackendConfig) -> Self {
        Self { client, config }
    }

    fn request_body(&self, prompt: &RenderedPrompt, tools: &[ToolSpec]) -> Value {
        let tools: Vec<Value> = tools.iter().map(ToolSpec::to_openai).collect();
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "tools": tools,
            "tool_choice": "auto",
            "max_tokens": self.config.max_tokens,
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt, tools: &[ToolSpec]) -> Result<Completion, LlmError> {
        let url = format!("{}/chat/completions", self.config.api_url);
        let mut request = self.client.post(&url).json(&self.request_body(prompt, tools));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let json = send(request).await?;
        extract_openai_completion(&json)
    }
}

/// Extract tool calls and usage from a chat completions response.
///
/// A message with no `tool_calls` is a valid, empty answer.
fn extract_openai_completion(json: &Value) -> Result<Completion, LlmError> {
    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| LlmError::Response(String::from("response missing choices[0].message")))?;

    let calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let function = call.get("function")?;
                    let name = function.get("name")?.as_str()?.to_owned();
                    let arguments = match function.get("arguments") {
                        Some(Value::String(text)) => text.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    };
                    Some(RawToolCall { name, arguments })
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = json.get("usage");
    Ok(Completion {
        calls,
        prompt_tokens: token_count(usage, "prompt_tokens"),
        completion_tokens: token_count(usage, "completion_tokens"),
    })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - Uses `x-api-key` header instead of `Authorization: Bearer`
/// - System is a top-level field, not a message
/// - Tool calls arrive as `tool_use` content blocks with an object `input`
#[derive(Debug)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    config: LlmBackendConfig,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub const fn new(client: reqwest::Client, config: LlmBackendConfig) -> Self {
        Self { client, config }
    }

    fn request_body(&self, prompt: &RenderedPrompt, tools: &[ToolSpec]) -> Value {
        let tools: Vec<Value> = tools.iter().map(ToolSpec::to_anthropic).collect();
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ],
            "tools": tools,
            "tool_choice": {"type": "auto"},
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt, tools: &[ToolSpec]) -> Result<Completion, LlmError> {
        let url = format!("{}/messages", self.config.api_url);
        let mut request = self
            .client
            .post(&url)
            .header("anthropic-version", "2023-06-01")
            .json(&self.request_body(prompt, tools));
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }
        let json = send(request).await?;
        extract_anthropic_completion(&json)
    }
}

/// Extract `tool_use` blocks and usage from a Messages API response.
fn extract_anthropic_completion(json: &Value) -> Result<Completion, LlmError> {
    let content = json
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::Response(String::from("response missing content array")))?;

    let calls = content
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
        .filter_map(|block| {
            let name = block.get("name")?.as_str()?.to_owned();
            let arguments = block.get("input").map(Value::to_string).unwrap_or_default();
            Some(RawToolCall { name, arguments })
        })
        .collect();

    let usage = json.get("usage");
    Ok(Completion {
        calls,
        prompt_tokens: token_count(usage, "input_tokens"),
        completion_tokens: token_count(usage, "output_tokens"),
    })
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// Send a prepared request and decode a successful JSON body.
async fn send(request: reqwest::RequestBuilder) -> Result<Value, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::Transport(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("unable to read error body"));
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::Response(format!("body is not JSON: {e}")))
}

fn token_count(usage: Option<&Value>, field: &str) -> u32 {
    usage
        .and_then(|u| u.get(field))
        .and_then(Value::as_u64)
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
///
/// # Errors
///
/// Returns [`LlmError::Config`] if the HTTP client cannot be built.
pub fn create_backend(config: &LlmBackendConfig) -> Result<LlmBackend, LlmError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))?;
    Ok(match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(client, config.clone())),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(client, config.clone())),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::LifeStage;

    use super::*;
    use crate::schema::tools_for;

    fn backend_config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: String::from("http://localhost:9"),
            api_key: Some(String::from("test")),
            model: String::from("test-model"),
            max_tokens: 256,
        }
    }

    fn prompt() -> RenderedPrompt {
        RenderedPrompt {
            system: String::from("You are Luna."),
            user: String::from("What now?"),
        }
    }

    #[test]
    fn openai_tool_calls_are_extracted() {
        let json = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"type": "function", "function": {"name": "move", "arguments": "{\"to\": {\"x\": 1, \"y\": 2}}"}},
                        {"type": "function", "function": {"name": "craft", "arguments": {"recipe": "rope"}}}
                    ]
                }
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18}
        });
        let completion = extract_openai_completion(&json).unwrap();
        assert_eq!(completion.calls.len(), 2);
        assert_eq!(completion.calls.first().unwrap().name, "move");
        assert!(completion.calls.get(1).unwrap().arguments.contains("rope"));
        assert_eq!(completion.prompt_tokens, 120);
        assert_eq!(completion.completion_tokens, 18);
    }

    #[test]
    fn openai_text_only_answer_is_empty() {
        let json = json!({"choices": [{"message": {"content": "I will rest."}}]});
        let completion = extract_openai_completion(&json).unwrap();
        assert!(completion.calls.is_empty());
        assert_eq!(completion.prompt_tokens, 0);
    }

    #[test]
    fn openai_missing_choices_is_an_error() {
        let json = json!({"error": "rate_limit"});
        assert!(matches!(extract_openai_completion(&json), Err(LlmError::Response(_))));
    }

    #[test]
    fn anthropic_tool_use_blocks_are_extracted() {
        let json = json!({
            "content": [
                {"type": "text", "text": "Let me gather some wood."},
                {"type": "tool_use", "id": "toolu_1", "name": "gather", "input": {"resource": "wood", "at": {"x": 0, "y": 1}}}
            ],
            "usage": {"input_tokens": 300, "output_tokens": 40}
        });
        let completion = extract_anthropic_completion(&json).unwrap();
        assert_eq!(completion.calls.len(), 1);
        let call = completion.calls.first().unwrap();
        assert_eq!(call.name, "gather");
        assert!(call.arguments.contains("\"wood\""));
        assert_eq!(completion.prompt_tokens, 300);
        assert_eq!(completion.completion_tokens, 40);
    }

    #[test]
    fn anthropic_missing_content_is_an_error() {
        let json = json!({"type": "error"});
        assert!(extract_anthropic_completion(&json).is_err());
    }

    #[test]
    fn request_bodies_carry_tools() {
        let tools = tools_for(LifeStage::Child);
        let openai = OpenAiBackend::new(reqwest::Client::new(), backend_config(BackendType::OpenAi));
        let body = openai.request_body(&prompt(), &tools);
        assert_eq!(body["tools"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 256);

        let anthropic = AnthropicBackend::new(reqwest::Client::new(), backend_config(BackendType::Anthropic));
        let body = anthropic.request_body(&prompt(), &tools);
        assert_eq!(body["system"], "You are Luna.");
        assert_eq!(body["tools"][0]["name"], "move");
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        let backend = create_backend(&backend_config(BackendType::OpenAi)).unwrap();
        assert_eq!(backend.name(), "openai-compatible");
        assert_eq!(backend.model(), "test-model");

        let backend = create_backend(&backend_config(BackendType::Anthropic)).unwrap();
        assert_eq!(backend.name(), "anthropic");
    }
}
