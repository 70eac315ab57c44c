//! Error types for the Alfred domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps the two that
//! can end a dialogue run.

use thiserror::Error;

use crate::message::Message;

/// The error a dialogue run can end with.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model backend errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Dialogue loop errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// The message list handed to the loop is empty or doesn't open with a user turn.
    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    /// The model kept requesting tools past the configured cycle cap.
    /// `history` holds every message up to and including the last assistant reply.
    #[error("Tool-cycle limit of {limit} exceeded after {} messages", history.len())]
    IterationLimitExceeded { limit: u32, history: Vec<Message> },
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to fetch guest corpus from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("Failed to parse guest records: {0}")]
    Parse(String),

    #[error("Failed to read guest file {path}: {reason}")]
    Io { path: String, reason: String },
}
