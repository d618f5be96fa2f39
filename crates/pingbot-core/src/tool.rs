//! Tool System
//!
//! Tools are registered once at startup and invoked by the tool-call loop
//! through native function calling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Map<String, Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }
}

/// Failure record for one target of a tool call.
///
/// Every failure path (unknown tool, bad arguments, tool error, failed probe)
/// is reported to the model in this shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub host: String,
    pub error: String,
}

impl TargetFailure {
    pub fn new(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            error: error.into(),
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Serialized output, used verbatim as the tool message content
    pub output: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    /// A single-record failure: `[{"host": <target>, "error": <error>}]`
    pub fn failure(name: impl Into<String>, target: impl Into<String>, error: impl Into<String>) -> Self {
        let records = vec![TargetFailure::new(target, error)];
        let data = json!(records);
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: data.to_string(),
            data: Some(data),
        }
    }

    /// Reply for a tool name the registry does not know
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::failure(name.clone(), name, "Unknown tool")
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Element type for array parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Render as a `{"type": "function", ...}` entry for the chat request
    pub fn to_function_json(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(items) = &param.items {
                prop["items"] = json!({ "type": items });
            }
            properties.insert(param.name.clone(), prop);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution (optional)
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        // Validate first
        tool.validate(call)?;

        tool.execute(call).await
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Get tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the text back".into(),
                parameters: vec![ParameterSchema {
                    name: "text".into(),
                    param_type: "string".into(),
                    items: None,
                    description: "Text to echo".into(),
                    required: true,
                }],
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let text = call.arguments.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(ToolResult::success("echo", text))
        }
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        let Value::Object(arguments) = arguments else {
            panic!("arguments must be an object");
        };
        ToolCall::new(name, arguments)
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.execute(&call("echo", json!({"text": "hi"}))).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hi");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute(&call("traceroute", json!({}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "traceroute"));
    }

    #[tokio::test]
    async fn test_missing_required_parameter() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let err = registry.execute(&call("echo", json!({}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }

    #[test]
    fn test_unknown_tool_result() {
        let result = ToolResult::unknown_tool("traceroute");
        assert!(!result.success);

        let records: Vec<TargetFailure> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(records, vec![TargetFailure::new("traceroute", "Unknown tool")]);
    }

    #[test]
    fn test_function_json() {
        let schema = ToolSchema {
            name: "ping".into(),
            description: "Ping hosts".into(),
            parameters: vec![ParameterSchema {
                name: "hosts".into(),
                param_type: "array".into(),
                items: Some("string".into()),
                description: "Hosts to ping".into(),
                required: true,
            }],
        };

        let json = schema.to_function_json();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "ping");
        assert_eq!(json["function"]["parameters"]["properties"]["hosts"]["items"]["type"], "string");
        assert_eq!(json["function"]["parameters"]["required"], json!(["hosts"]));
    }
}
