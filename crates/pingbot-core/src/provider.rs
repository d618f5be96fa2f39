//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for LLM backends so the agent loop never
//! depends on a particular wire format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pingbot_core::provider::{CompletionBuilder, GenerationOptions, LlmProvider};
//!
//! let mut stream = provider.complete_stream(&messages, &tools, &options).await?;
//! let mut builder = CompletionBuilder::default();
//! while let Some(chunk) = stream.next().await {
//!     builder.push(chunk?);
//! }
//! let completion = builder.finish(&options.model);
//! ```

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "qwen3:4b", "llama3.2")
    pub model: String,

    /// Temperature for sampling; `None` leaves the model default
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate; `None` leaves the model default
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Top-p nucleus sampling
    #[serde(default)]
    pub top_p: Option<f32>,

    /// Ask reasoning models to emit (or suppress) a thinking trace
    #[serde(default)]
    pub think: Option<bool>,
}

pub const DEFAULT_MODEL: &str = "qwen3:4b";

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            think: None,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug)]
pub struct Completion {
    /// The assembled assistant message
    pub message: Message,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    Error,
}

/// A partial update from a streaming completion.
///
/// Any of the three channels may be empty in a given chunk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Thinking trace fragment
    #[serde(default)]
    pub thinking: String,

    /// Answer text fragment
    #[serde(default)]
    pub content: String,

    /// Tool calls completed in this chunk
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Token usage (typically only on final chunk)
    #[serde(default)]
    pub usage: Option<TokenUsage>,

    /// Finish reason reported with the final chunk
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            content: delta.into(),
            ..Default::default()
        }
    }

    pub fn thinking(delta: impl Into<String>) -> Self {
        Self {
            thinking: delta.into(),
            ..Default::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }
}

/// Stream type for completion streaming
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Folds streamed chunks into one assistant message
#[derive(Debug, Default)]
pub struct CompletionBuilder {
    thinking: String,
    content: String,
    tool_calls: Vec<ToolCall>,
    usage: Option<TokenUsage>,
    finish_reason: Option<FinishReason>,
}

impl CompletionBuilder {
    pub fn push(&mut self, chunk: StreamChunk) {
        self.thinking.push_str(&chunk.thinking);
        self.content.push_str(&chunk.content);
        self.tool_calls.extend(chunk.tool_calls);
        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }
        if chunk.finish_reason.is_some() {
            self.finish_reason = chunk.finish_reason;
        }
    }

    /// Thinking accumulated so far
    pub fn thinking(&self) -> &str {
        &self.thinking
    }

    /// Content accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn finish(self, model: &str) -> Completion {
        let finish_reason = match self.finish_reason {
            Some(reason) => Some(reason),
            None if !self.tool_calls.is_empty() => Some(FinishReason::ToolUse),
            None => Some(FinishReason::Stop),
        };

        Completion {
            message: Message::assistant(self.content)
                .with_thinking(self.thinking)
                .with_tool_calls(self.tool_calls),
            model: model.to_string(),
            usage: self.usage,
            finish_reason,
        }
    }
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a streaming completion, offering `tools` for native calling
    async fn complete_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<CompletionStream>;

    /// Generate a completion by folding the stream
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let mut stream = self.complete_stream(messages, tools, options).await?;
        let mut builder = CompletionBuilder::default();
        while let Some(chunk) = stream.next().await {
            builder.push(chunk?);
        }
        Ok(builder.finish(&options.model))
    }

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}
