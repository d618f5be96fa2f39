//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error (request rejected, stream broke, backend error line)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Maximum iterations reached in the tool-call loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Parse error (e.g., malformed stream line)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => format!("The model backend encountered an error: {}", msg),
            AgentError::ProviderUnavailable(_) => "The model backend is currently unavailable. Is `ollama serve` running?".into(),
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::ToolValidation(msg) => format!("Invalid tool input: {}", msg),
            AgentError::ToolExecution(msg) => format!("Tool error: {}", msg),
            AgentError::MaxIterations(max) => format!("Stopped after {} model rounds without a final answer.", max),
            AgentError::Config(msg) => format!("Invalid configuration: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = AgentError::MaxIterations(4).user_message();
        assert!(msg.contains('4'));
    }
}
