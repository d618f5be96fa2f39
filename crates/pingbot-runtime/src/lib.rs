//! # pingbot-runtime
//!
//! Runtime providers for pingbot.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference via the Ollama chat API, with
//!   streamed thinking, content and native tool calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pingbot_runtime::ollama::{OllamaConfig, OllamaProvider};
//!
//! let config = OllamaConfig::from_lookup(|key| std::env::var(key).ok())?;
//! let provider = OllamaProvider::from_config(config)?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use pingbot_core::{
    Agent, AgentError, LlmProvider, Message, Result, Role, Session, Tool, ToolRegistry,
};
