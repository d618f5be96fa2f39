//! Ping Tool
//!
//! Exposes the prober to the model as the `ping` tool.

use async_trait::async_trait;
use serde_json::Value;

use pingbot_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::probe::Prober;

/// Tool for probing host reachability
pub struct PingTool {
    prober: Prober,
}

impl PingTool {
    pub fn new(prober: Prober) -> Self {
        Self { prober }
    }
}

/// Accepts `["a", "b"]` or the looser `"a, b"`
fn parse_hosts(value: &Value) -> CoreResult<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(host) => Ok(host.trim().to_string()),
                other => Err(AgentError::ToolValidation(format!(
                    "hosts must be strings, got {}",
                    other
                ))),
            })
            .collect(),
        Value::String(list) => Ok(list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        other => Err(AgentError::ToolValidation(format!(
            "hosts must be a list of host names, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Tool for PingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "ping".into(),
            description: format!(
                "Ping one or more hosts ({} echo requests each). Returns min/avg/max round-trip \
                 time in milliseconds and packet loss percentage per host, or an error.",
                self.prober.count()
            ),
            parameters: vec![ParameterSchema {
                name: "hosts".into(),
                param_type: "array".into(),
                items: Some("string".into()),
                description: "Host names or IP addresses to ping (e.g., ['8.8.8.8', 'example.com'])".into(),
                required: true,
            }],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let hosts = call
            .arguments
            .get("hosts")
            .map(parse_hosts)
            .transpose()?
            .unwrap_or_default();

        let outcomes = self.prober.probe(&hosts).await;
        // `to_value` sorts keys; the text keeps field order
        let output = serde_json::to_string(&outcomes)?;
        let data = serde_json::to_value(&outcomes)?;

        Ok(ToolResult::success("ping", output).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::model::ProbeOutcome;
    use crate::runner::StaticPingRunner;
    use pingbot_core::provider::{CompletionStream, GenerationOptions, ModelInfo};
    use pingbot_core::{AgentBuilder, Conversation, LlmProvider, Message, Role, StreamChunk, ToolRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tool() -> PingTool {
        let runner = StaticPingRunner::new().reachable("8.8.8.8", 9.0, 10.0, 11.0);
        PingTool::new(Prober::new(Arc::new(runner)))
    }

    fn call(arguments: Value) -> ToolCall {
        let Value::Object(arguments) = arguments else {
            panic!("arguments must be an object");
        };
        ToolCall::new("ping", arguments)
    }

    #[tokio::test]
    async fn test_ping_tool_output_is_outcome_list() {
        let result = tool()
            .execute(&call(json!({"hosts": ["8.8.8.8", "256.256.256.256"]})))
            .await
            .unwrap();

        assert!(result.success);
        let outcomes: Vec<ProbeOutcome> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].host(), "256.256.256.256");
        assert!(!outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_comma_separated_hosts() {
        let result = tool().execute(&call(json!({"hosts": "8.8.8.8, example.invalid"}))).await.unwrap();

        let outcomes: Vec<ProbeOutcome> = serde_json::from_str(&result.output).unwrap();
        let hosts: Vec<&str> = outcomes.iter().map(ProbeOutcome::host).collect();
        assert_eq!(hosts, vec!["8.8.8.8", "example.invalid"]);
    }

    #[tokio::test]
    async fn test_bad_hosts_type() {
        let err = tool().execute(&call(json!({"hosts": 42}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }

    #[tokio::test]
    async fn test_output_keeps_field_order() {
        let result = tool().execute(&call(json!({"hosts": ["8.8.8.8"]}))).await.unwrap();

        let keys = ["\"host\"", "\"rtt_min\"", "\"rtt_avg\"", "\"rtt_max\"", "\"packet_loss\""];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| result.output.find(key).unwrap_or_else(|| panic!("{} missing", key)))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "fields out of order in {}", result.output);
    }

    #[tokio::test]
    async fn test_registered_as_ping() {
        let mut registry = ToolRegistry::new();
        registry.register(tool());

        assert_eq!(registry.names(), vec!["ping"]);
        let schema = &registry.schemas()[0];
        assert!(schema.description.contains("5 echo requests"));

        let err = registry.execute(&call(json!({}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }

    /// Asks for a ping of an unresolvable host, then answers once the result arrives
    struct PingOnceProvider {
        calls: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl LlmProvider for PingOnceProvider {
        async fn health_check(&self) -> CoreResult<bool> {
            Ok(true)
        }

        async fn complete_stream(
            &self,
            messages: &[Message],
            _tools: &[ToolSchema],
            _options: &GenerationOptions,
        ) -> CoreResult<CompletionStream> {
            let round = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(messages.len());
                calls.len()
            };

            let chunk = if round == 1 {
                StreamChunk::tool_calls(vec![call(json!({"hosts": ["256.256.256.256"]}))])
            } else {
                StreamChunk::content("256.256.256.256 could not be resolved.")
            };
            let chunks: Vec<CoreResult<StreamChunk>> = vec![Ok(chunk)];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }

        async fn list_models(&self) -> CoreResult<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_unresolvable_host_round_trip_through_agent() {
        let provider = Arc::new(PingOnceProvider {
            calls: Mutex::default(),
        });
        let agent = AgentBuilder::new()
            .provider(provider.clone())
            .tool(tool())
            .build()
            .unwrap();

        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.push(Message::user("Is 256.256.256.256 up?"));
        let answer = agent.run(&mut conversation).await.unwrap();

        assert_eq!(answer, "256.256.256.256 could not be resolved.");
        // system + user, then + assistant tool call + tool message
        assert_eq!(*provider.calls.lock().unwrap(), vec![2, 4]);

        let tool_message = &conversation.messages()[3];
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.tool_name.as_deref(), Some("ping"));

        let outcomes: Vec<ProbeOutcome> = serde_json::from_str(&tool_message.content).unwrap();
        assert_eq!(outcomes.len(), 1);
        let ProbeOutcome::Failure(failure) = &outcomes[0] else {
            panic!("expected failure, got {:?}", outcomes[0]);
        };
        assert_eq!(failure.host, "256.256.256.256");
        assert!(!failure.error.is_empty());
    }
}
