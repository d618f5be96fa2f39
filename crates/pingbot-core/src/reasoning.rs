//! Tool-Call Loop
//!
//! Drives the model until it answers without requesting a tool:
//!
//! ```text
//! AWAITING_MODEL ──tool calls──▶ EXECUTING_TOOLS ──▶ AWAITING_MODEL
//!        │
//!        └──no tool calls──▶ DONE
//! ```
//!
//! Tool failures never end the loop; they are fed back to the model as
//! failure records and the model decides what to do next.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{CompletionBuilder, GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug, Default)]
pub struct AgentConfig {
    /// Maximum model rounds per user turn; `None` never stops the loop
    pub max_iterations: Option<usize>,

    /// Generation options
    pub generation: GenerationOptions,
}

/// Receives progress while a turn runs. All methods default to no-ops.
pub trait TurnObserver: Send {
    /// The model finished one reply (before any of its tool calls run)
    fn on_model_reply(&mut self, _message: &Message) {}

    /// A tool call is about to run
    fn on_tool_call(&mut self, _call: &ToolCall) {}

    /// A tool call finished
    fn on_tool_result(&mut self, _call: &ToolCall, _result: &ToolResult) {}
}

struct NoopObserver;

impl TurnObserver for NoopObserver {}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Run the loop on a conversation whose last message is the user's input.
    ///
    /// Returns the content of the final assistant message.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String> {
        self.run_observed(conversation, &mut NoopObserver).await
    }

    /// Same as [`Agent::run`], reporting progress to `observer`
    pub async fn run_observed(
        &self,
        conversation: &mut Conversation,
        observer: &mut dyn TurnObserver,
    ) -> Result<String> {
        let schemas = self.tools.schemas();
        let mut iterations = 0;

        loop {
            iterations += 1;

            if let Some(max) = self.config.max_iterations {
                if iterations > max {
                    return Err(AgentError::MaxIterations(max));
                }
            }

            tracing::debug!(iteration = iterations, messages = conversation.len(), "Calling model");

            let mut stream = self
                .provider
                .complete_stream(conversation.messages(), &schemas, &self.config.generation)
                .await?;

            let mut builder = CompletionBuilder::default();
            while let Some(chunk) = stream.next().await {
                builder.push(chunk?);
            }

            let mut message = builder.finish(&self.config.generation.model).message;
            for call in &mut message.tool_calls {
                if call.id.is_none() {
                    call.id = Some(uuid::Uuid::new_v4().to_string());
                }
            }

            observer.on_model_reply(&message);

            // Appended whether or not it carries tool calls
            if !message.has_tool_calls() {
                let content = message.content.clone();
                conversation.push(message);
                return Ok(content);
            }
            let tool_calls = message.tool_calls.clone();
            conversation.push(message);

            for call in &tool_calls {
                tracing::debug!(tool = %call.name, id = ?call.id, "Executing tool");
                observer.on_tool_call(call);

                let result = self.execute_tool(call).await;
                observer.on_tool_result(call, &result);

                conversation.push(Message::tool(&call.name, &result.output));
            }
        }
    }

    /// Execute a tool call. Every failure becomes a failure record.
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        let outcome = AssertUnwindSafe(self.tools.execute(call)).catch_unwind().await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(AgentError::ToolNotFound(name))) => {
                tracing::warn!(tool = %name, "Model requested unknown tool");
                ToolResult::unknown_tool(name)
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                ToolResult::failure(&call.name, &call.name, e.to_string())
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                tracing::warn!(tool = %call.name, %reason, "Tool panicked");
                ToolResult::failure(&call.name, &call.name, format!("Tool panicked: {}", reason))
            }
        };

        result.with_id(call.id.clone())
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn generation(mut self, generation: GenerationOptions) -> Self {
        self.config.generation = generation;
        self
    }

    pub fn max_iterations(mut self, max: Option<usize>) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
