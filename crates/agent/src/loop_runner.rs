//! The dialogue loop implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alfred_core::error::{AgentError, ProviderError, ToolError};
use alfred_core::event::{DomainEvent, EventBus};
use alfred_core::message::{Message, MessageToolCall, Role};
use alfred_core::provider::{Provider, ProviderRequest, ToolDefinition};
use alfred_core::tool::{ToolCall, ToolRegistry};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Prefix of every tool message that reports a failure instead of a result.
pub const TOOL_ERROR_PREFIX: &str = "Error: ";

const DEFAULT_MAX_ITERATIONS: u32 = 10;
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a run currently is.
#[derive(Debug, Clone)]
pub enum LoopState {
    /// History is ready; the next step is a model call.
    AwaitingModel,
    /// The last assistant message asked for these tools.
    ExecutingTools(Vec<MessageToolCall>),
    /// The model answered without tool calls.
    Done(Message),
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    /// The caller's messages followed by everything the run appended.
    pub messages: Vec<Message>,
    /// The final assistant message (also the last entry of `messages`).
    pub reply: Message,
    pub model_calls: u32,
    pub tool_cycles: u32,
}

/// Alternates model calls with tool execution until the model answers in text.
///
/// A loop holds no per-run state, so one instance can serve concurrent runs.
pub struct DialogueLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    system_prompt: Option<String>,
    /// Maximum tool cycles per run
    max_iterations: u32,
    model_timeout: Duration,
    tool_timeout: Duration,
    event_bus: Arc<EventBus>,
}

impl DialogueLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            event_bus,
        }
    }

    /// Instructions sent ahead of the history on every model call. Never stored in history.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        self
    }

    /// Set the maximum number of tool cycles. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop over `initial` and return the final assistant message.
    pub async fn run(&self, initial: &[Message]) -> Result<Message, alfred_core::Error> {
        self.run_transcript(initial).await.map(|t| t.reply)
    }

    /// Run the loop over `initial` and return the full history it produced.
    ///
    /// The caller's slice is never modified. Tool failures are appended as
    /// tool messages starting with [`TOOL_ERROR_PREFIX`]; model failures and
    /// running past the tool-cycle cap end the run with an error.
    pub async fn run_transcript(
        &self,
        initial: &[Message],
    ) -> Result<Transcript, alfred_core::Error> {
        validate_conversation(initial)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let definitions = self.tools.definitions();
        let mut history = initial.to_vec();
        let mut model_calls = 0u32;
        let mut tool_cycles = 0u32;
        let mut state = LoopState::AwaitingModel;

        info!(
            run_id = %run_id,
            messages = history.len(),
            tools = definitions.len(),
            "Starting dialogue run"
        );

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    model_calls += 1;
                    debug!(run_id = %run_id, call = model_calls, "Calling model");

                    let reply = match self.call_model(&run_id, &history, &definitions).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            self.publish_error(&run_id, &e.to_string());
                            return Err(e.into());
                        }
                    };
                    history.push(reply.clone());

                    if reply.tool_calls.is_empty() {
                        LoopState::Done(reply)
                    } else if tool_cycles >= self.max_iterations {
                        warn!(
                            run_id = %run_id,
                            limit = self.max_iterations,
                            "Model is still requesting tools at the cycle limit"
                        );
                        let err = AgentError::IterationLimitExceeded {
                            limit: self.max_iterations,
                            history,
                        };
                        self.publish_error(&run_id, &err.to_string());
                        return Err(err.into());
                    } else {
                        LoopState::ExecutingTools(reply.tool_calls)
                    }
                }
                LoopState::ExecutingTools(calls) => {
                    tool_cycles += 1;
                    debug!(
                        run_id = %run_id,
                        cycle = tool_cycles,
                        tool_count = calls.len(),
                        "Executing tool calls"
                    );
                    // Sequential, in emitted order.
                    for call in &calls {
                        let content = self.execute_tool(&run_id, call).await;
                        history.push(Message::tool_result(&call.id, content));
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Done(reply) => {
                    info!(
                        run_id = %run_id,
                        model_calls,
                        tool_cycles,
                        "Dialogue run finished"
                    );
                    return Ok(Transcript {
                        messages: history,
                        reply,
                        model_calls,
                        tool_cycles,
                    });
                }
            };
        }
    }

    /// One model call under the model timeout.
    async fn call_model(
        &self,
        run_id: &str,
        history: &[Message],
        definitions: &[ToolDefinition],
    ) -> Result<Message, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend_from_slice(history);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: definitions.to_vec(),
        };

        let response = tokio::time::timeout(self.model_timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "model call exceeded {}ms",
                    self.model_timeout.as_millis()
                ))
            })??;

        self.event_bus.publish(DomainEvent::ResponseGenerated {
            run_id: run_id.to_string(),
            model: response.model.clone(),
            tool_calls: response.message.tool_calls.len(),
            tokens_used: response.usage.as_ref().map(|u| u.total_tokens),
            timestamp: chrono::Utc::now(),
        });

        let mut message = response.message;
        if message.role != Role::Assistant {
            debug!(role = ?message.role, "Model reply carried a non-assistant role");
            message.role = Role::Assistant;
        }
        Ok(message)
    }

    /// Run one requested tool and render the outcome as tool-message content.
    async fn execute_tool(&self, run_id: &str, call: &MessageToolCall) -> String {
        let start = Instant::now();
        let outcome = self.dispatch(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (success, content) = match outcome {
            Ok(result) => (result.success, result.output),
            Err(e) => {
                warn!(run_id = %run_id, tool = %call.name, error = %e, "Tool call failed");
                (false, format!("{TOOL_ERROR_PREFIX}{e}"))
            }
        };

        self.event_bus.publish(DomainEvent::ToolExecuted {
            run_id: run_id.to_string(),
            tool_name: call.name.clone(),
            call_id: call.id.clone(),
            success,
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        content
    }

    async fn dispatch(
        &self,
        call: &MessageToolCall,
    ) -> Result<alfred_core::tool::ToolResult, ToolError> {
        if self.tools.get(&call.name).is_none() {
            return Err(ToolError::NotFound(call.name.clone()));
        }
        let call = ToolCall::try_from(call)?;
        tokio::time::timeout(self.tool_timeout, self.tools.execute(&call))
            .await
            .map_err(|_| ToolError::Timeout {
                tool_name: call.name.clone(),
                timeout_ms: u64::try_from(self.tool_timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    fn publish_error(&self, run_id: &str, message: &str) {
        self.event_bus.publish(DomainEvent::ErrorOccurred {
            run_id: run_id.to_string(),
            error_message: message.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}

/// A run needs at least one message and must open with the user.
fn validate_conversation(messages: &[Message]) -> Result<(), AgentError> {
    match messages.first() {
        None => Err(AgentError::InvalidConversation(
            "no messages to respond to".into(),
        )),
        Some(first) if first.role != Role::User => Err(AgentError::InvalidConversation(
            format!("first message must come from the user, got {:?}", first.role),
        )),
        Some(_) => Ok(()),
    }
}
