//! # pingbot-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a native
//! tool-calling loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Tool-call  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ┌─────────────┐                                             │
//! │  │Conversation │  append-only, owned by the caller            │
//! │  └─────────────┘                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop sends the whole conversation to the provider, folds the streamed
//! reply into one assistant message, runs every tool call it carries, and
//! repeats until the model answers without calling a tool.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{CompletionBuilder, LlmProvider, StreamChunk};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, TurnObserver};
pub use session::Session;
pub use tool::{TargetFailure, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
