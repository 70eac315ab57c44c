//! # Alfred Core
//!
//! Domain types, traits, and error definitions shared by every Alfred crate.
//!
//! The model backend and the tools are reached only through the [`Provider`]
//! and [`Tool`] traits, so the dialogue loop can run against fakes in tests
//! and against a hosted endpoint in the CLI.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

pub use error::{AgentError, CorpusError, Error, ProviderError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
