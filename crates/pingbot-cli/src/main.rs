//! pingbot
//!
//! Reads one question per line from stdin and answers it with a local Ollama
//! model that can ping hosts. Runs until stdin is exhausted.

mod config;
mod render;

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{StreamExt, wrappers::LinesStream};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pingbot_core::{AgentBuilder, LlmProvider, Session, ToolRegistry};
use pingbot_probe::{Prober, SystemPingRunner, tools::PingTool};
use pingbot_runtime::OllamaProvider;

use crate::config::AppConfig;
use crate::render::TerminalPresenter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment before anything reads it
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with answers
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AppConfig::from_env()?;

    let provider = Arc::new(OllamaProvider::from_config(config.ollama.clone())?);
    check_backend(provider.as_ref(), &config.generation.model).await;

    let runner = SystemPingRunner::new().with_timeout(config.ping_timeout);
    let prober = Prober::new(Arc::new(runner)).with_count(config.ping_count);

    let mut tools = ToolRegistry::new();
    tools.register(PingTool::new(prober));
    tracing::info!(tools = ?tools.names(), "Registered tools");

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .generation(config.generation.clone())
        .max_iterations(config.max_iterations)
        .build()?;

    let mut session = Session::with_system_prompt(&config.system_prompt);
    let mut presenter = TerminalPresenter::new(io::stdout());

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        presenter.prompt(input);
        session.push_user(input);

        if let Err(e) = agent.run_observed(&mut session.conversation, &mut presenter).await {
            tracing::error!(error = %e, "Turn failed");
            presenter.error(&e.user_message());
        }
        session.touch();

        presenter.separator();
    }

    tracing::info!(
        session = %session.id,
        turns = session.turns(),
        messages = session.message_count(),
        elapsed_secs = session.duration().num_seconds(),
        "Input exhausted"
    );

    Ok(())
}

/// Warn early when Ollama is unreachable or the model has not been pulled
async fn check_backend(provider: &dyn LlmProvider, model: &str) {
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!(model, "Connected to Ollama");
            match provider.list_models().await {
                Ok(models) if !models.iter().any(|m| m.id == model || m.id == format!("{}:latest", model)) => {
                    tracing::warn!(model, "Model not found locally; try `ollama pull {}`", model);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Could not list models"),
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("Ollama not available; make sure it is running: ollama serve");
        }
    }
}
