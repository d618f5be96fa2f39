//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference.
//!
//! Chat goes straight to `POST /api/chat` so that tool schemas, thinking
//! traces and tool calls travel in Ollama's native shape; `ollama-rs` is used
//! for model discovery.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use ollama_rs::Ollama;
use pingbot_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        CompletionStream, FinishReason, GenerationOptions, LlmProvider, ModelInfo,
        StreamChunk, TokenUsage,
    },
    tool::{ToolCall, ToolSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    /// Read `OLLAMA_HOST` and `OLLAMA_PORT` through `lookup`, falling back
    /// to localhost:11434
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            let host = host.trim().trim_end_matches('/');
            // `ollama serve` accepts a bare host[:port]; reqwest needs a scheme
            config.host = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{}", host)
            };
            if let Some((base, port)) = split_port(&config.host) {
                config.host = base.to_string();
                config.port = port;
            }
        }

        if let Some(port) = lookup("OLLAMA_PORT").filter(|p| !p.trim().is_empty()) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AgentError::Config(format!("OLLAMA_PORT must be a port number, got {:?}", port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject hosts that are not an absolute http(s) URL with a host name
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            AgentError::Config(format!("OLLAMA_HOST {:?} is not usable: {}", self.host, reason))
        };

        let url = reqwest::Url::parse(&self.host).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host name".into()));
        }
        Ok(())
    }

    /// Full URL of the chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}:{}/api/chat", self.host.trim_end_matches('/'), self.port)
    }
}

/// Split `scheme://host:port` into `scheme://host` and the port
fn split_port(url: &str) -> Option<(&str, u16)> {
    let authority_start = url.find("://")? + 3;
    let (base, port) = url.rsplit_once(':')?;
    if base.len() < authority_start {
        return None;
    }
    port.parse().ok().map(|port| (base, port))
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Ok(Self {
            client: Ollama::new(&config.host, config.port),
            http,
            config,
        })
    }

    /// Convert agent messages to Ollama format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
                thinking: match m.role {
                    Role::Assistant => m.thinking.clone(),
                    _ => None,
                },
                tool_calls: m
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        function: WireFunction {
                            name: call.name.clone(),
                            arguments: Value::Object(call.arguments.clone()),
                        },
                    })
                    .collect(),
                tool_name: m.tool_name.clone(),
            })
            .collect()
    }

    /// Build the request body
    fn build_request<'a>(
        messages: &[Message],
        tools: &[ToolSchema],
        opts: &'a GenerationOptions,
    ) -> ChatRequest<'a> {
        let mut options = Map::new();
        if let Some(temperature) = opts.temperature {
            options.insert("temperature".into(), temperature.into());
        }
        if let Some(top_p) = opts.top_p {
            options.insert("top_p".into(), top_p.into());
        }
        if let Some(max_tokens) = opts.max_tokens {
            options.insert("num_predict".into(), max_tokens.into());
        }

        ChatRequest {
            model: &opts.model,
            messages: Self::convert_messages(messages),
            tools: tools.iter().map(ToolSchema::to_function_json).collect(),
            stream: true,
            think: opts.think,
            options,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<CompletionStream> {
        let request = Self::build_request(messages, tools, options);

        tracing::debug!(
            model = %options.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat request"
        );

        let response = self
            .http
            .post(self.config.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AgentError::ProviderUnavailable(e.to_string())
                } else {
                    AgentError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(AgentError::Provider(format!("{}: {}", status, detail)));
        }

        // Transform the byte stream into decoded chunks
        let state = (
            Box::pin(response.bytes_stream()),
            ChatStreamDecoder::default(),
            VecDeque::new(),
            false,
        );
        let stream = futures::stream::unfold(
            state,
            |(mut bytes, mut decoder, mut pending, mut exhausted)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (bytes, decoder, pending, exhausted)));
                    }
                    if exhausted {
                        return None;
                    }
                    match bytes.next().await {
                        Some(Ok(data)) => pending.extend(decoder.push(&data)),
                        Some(Err(e)) => {
                            exhausted = true;
                            pending.push_back(Err(AgentError::Provider(e.to_string())));
                        }
                        None => {
                            exhausted = true;
                            pending.extend(decoder.finish());
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self.client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    options: Map<String, Value>,
}

#[derive(Serialize)]
struct WireMessage {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        // Some models send arguments as a JSON-encoded string
        let arguments = match call.function.arguments {
            Value::Object(map) => map,
            Value::String(raw) => match serde_json::from_str(&raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
            _ => Map::new(),
        };
        ToolCall::new(call.function.name, arguments)
    }
}

/// Message fragment inside one streamed line
#[derive(Deserialize, Default)]
struct WireDelta {
    #[serde(default)]
    content: String,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

/// One newline-delimited JSON object of a streamed chat response
#[derive(Deserialize)]
struct ChatResponseLine {
    #[serde(default)]
    message: Option<WireDelta>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Splits the response body into lines and decodes each one.
#[derive(Default)]
struct ChatStreamDecoder {
    buffer: Vec<u8>,
}

impl ChatStreamDecoder {
    /// Feed bytes; returns every chunk completed by them
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk>> {
        self.buffer.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            decoded.extend(decode_line(&line));
        }
        decoded
    }

    /// Decode whatever is left once the body ends
    fn finish(&mut self) -> Option<Result<StreamChunk>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Option<Result<StreamChunk>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed: ChatResponseLine = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => return Some(Err(AgentError::Parse(format!("bad stream line {:?}: {}", text, e)))),
    };

    if let Some(error) = parsed.error {
        return Some(Err(AgentError::Provider(error)));
    }

    let delta = parsed.message.unwrap_or_default();
    let usage = parsed.done.then(|| {
        let prompt_tokens = parsed.prompt_eval_count.unwrap_or(0);
        let completion_tokens = parsed.eval_count.unwrap_or(0);
        TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    });
    let finish_reason = parsed.done_reason.as_deref().map(|reason| match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        _ => FinishReason::Error,
    });

    Some(Ok(StreamChunk {
        thinking: delta.thinking.unwrap_or_default(),
        content: delta.content,
        tool_calls: delta.tool_calls.into_iter().map(ToolCall::from).collect(),
        done: parsed.done,
        usage,
        finish_reason,
    }))
}
