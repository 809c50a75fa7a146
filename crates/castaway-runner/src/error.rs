//! Error types for the LLM decision source.
//!
//! Uses `thiserror` for typed errors that surface through the request
//! pipeline: configuration, prompt rendering, HTTP calls, response shape.
//! None of these escape the crate as failures of a tick: the adapter folds
//! them into a [`castaway_core::DecisionOutcome`].

/// Errors that can occur while asking an LLM for a decision.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The request never produced an HTTP response.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("LLM backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },

    /// The attempt exceeded its deadline.
    #[error("LLM request timed out after {ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        ms: u64,
    },

    /// The response body did not have the expected shape.
    #[error("malformed LLM response: {0}")]
    Response(String),

    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, timeouts, rate limits, and server errors are
    /// retried. Client errors and bad configuration are not.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Response(_) | Self::Template(_) | Self::Config(_) | Self::Serde(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        assert!(LlmError::Transport(String::from("refused")).is_retryable());
        assert!(LlmError::Timeout { ms: 10 }.is_retryable());
        let limited = LlmError::Status {
            status: 429,
            body: String::new(),
        };
        assert!(limited.is_retryable());
        let unavailable = LlmError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(unavailable.is_retryable());
        let unauthorized = LlmError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(!unauthorized.is_retryable());
        assert!(!LlmError::Config(String::from("no key")).is_retryable());
    }
}
