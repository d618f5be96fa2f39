//! Configuration
//!
//! Everything comes from environment variables (optionally loaded from
//! `.env`). There are no command-line flags.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OLLAMA_HOST` / `OLLAMA_PORT` | `http://localhost` / `11434` |
//! | `PINGBOT_MODEL` | `qwen3:4b` |
//! | `PINGBOT_TEMPERATURE` | model default |
//! | `PINGBOT_THINK` | backend default |
//! | `PINGBOT_MAX_ITERATIONS` | unbounded (`0` also means unbounded) |
//! | `PINGBOT_PING_COUNT` | `5` |
//! | `PINGBOT_PING_TIMEOUT_SECS` | none |
//! | `PINGBOT_SYSTEM_PROMPT` | built-in prompt |

use std::str::FromStr;
use std::time::Duration;

use pingbot_core::{AgentError, Result, provider::GenerationOptions};
use pingbot_probe::{DEFAULT_COUNT, SYSTEM_PROMPT};
use pingbot_runtime::OllamaConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    pub generation: GenerationOptions,
    pub max_iterations: Option<usize>,
    pub ping_count: u32,
    pub ping_timeout: Option<Duration>,
    pub system_prompt: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ollama = OllamaConfig::from_lookup(&lookup)?;

        let mut generation = GenerationOptions::default();
        if let Some(model) = non_empty(&lookup, "PINGBOT_MODEL") {
            generation.model = model;
        }
        generation.temperature = parse_var(&lookup, "PINGBOT_TEMPERATURE")?;
        generation.think = parse_flag(&lookup, "PINGBOT_THINK")?;

        let max_iterations = parse_var::<usize>(&lookup, "PINGBOT_MAX_ITERATIONS")?.filter(|n| *n > 0);

        let ping_count = parse_var::<u32>(&lookup, "PINGBOT_PING_COUNT")?.unwrap_or(DEFAULT_COUNT);
        if ping_count == 0 {
            return Err(AgentError::Config("PINGBOT_PING_COUNT must be at least 1".into()));
        }

        let ping_timeout = parse_var::<f64>(&lookup, "PINGBOT_PING_TIMEOUT_SECS")?
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .ok()
                    .filter(|timeout| !timeout.is_zero())
                    .ok_or_else(|| {
                        AgentError::Config(format!(
                            "PINGBOT_PING_TIMEOUT_SECS must be a positive number, got {}",
                            secs
                        ))
                    })
            })
            .transpose()?;

        let system_prompt = non_empty(&lookup, "PINGBOT_SYSTEM_PROMPT").unwrap_or_else(|| SYSTEM_PROMPT.into());

        Ok(Self {
            ollama,
            generation,
            max_iterations,
            ping_count,
            ping_timeout,
            system_prompt,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    non_empty(lookup, key)
        .map(|raw| {
            raw.parse()
                .map_err(|_| AgentError::Config(format!("{} has an invalid value: {:?}", key, raw)))
        })
        .transpose()
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    non_empty(lookup, key)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AgentError::Config(format!("{} must be true or false, got {:?}", key, raw))),
        })
        .transpose()
}
