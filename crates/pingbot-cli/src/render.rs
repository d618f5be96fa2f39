//! Terminal rendering
//!
//! The `*_line` functions build plain text; [`TerminalPresenter`] adds color
//! and writes them out as the agent reports progress.

use std::io::Write;

use crossterm::style::Stylize;
use pingbot_core::{Message, ToolCall, ToolResult, TurnObserver};
use pingbot_probe::ProbeOutcome;
use serde_json::Value;

const THINKING_PREVIEW: usize = 80;

pub fn prompt_line(input: &str) -> String {
    format!("➜ {}", input)
}

/// `[Thinking...] ` followed by the first 80 characters of the trace
pub fn thinking_line(thinking: &str) -> Option<String> {
    let thinking = thinking.trim();
    if thinking.is_empty() {
        return None;
    }

    let mut preview: String = thinking.chars().take(THINKING_PREVIEW).collect();
    if thinking.chars().count() > THINKING_PREVIEW {
        preview.push_str("...");
    }
    Some(format!("[Thinking...] {}", preview.replace('\n', " ")))
}

/// Arguments pretty-printed without the enclosing braces
pub fn tool_call_args(call: &ToolCall) -> String {
    if call.arguments.is_empty() {
        return String::new();
    }

    let pretty = serde_json::to_string_pretty(&Value::Object(call.arguments.clone()))
        .unwrap_or_default();
    pretty
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .to_string()
}

/// One `(ok, line)` pair per probed host. Output that is not a list of
/// outcomes is shown as-is.
pub fn tool_result_lines(result: &ToolResult) -> Vec<(bool, String)> {
    match serde_json::from_str::<Vec<ProbeOutcome>>(&result.output) {
        Ok(outcomes) => outcomes.iter().map(outcome_line).collect(),
        Err(_) => vec![(result.success, format!("  {}", result.output))],
    }
}

fn outcome_line(outcome: &ProbeOutcome) -> (bool, String) {
    match outcome {
        ProbeOutcome::Success(stats) => (
            true,
            format!(
                "  ✓ {}: {:.1}ms avg (min={:.1}, max={:.1}), {}% loss",
                stats.host, stats.rtt_avg, stats.rtt_min, stats.rtt_max, stats.packet_loss
            ),
        ),
        ProbeOutcome::Failure(failure) => (false, format!("  ✗ {}: {}", failure.host, failure.error)),
    }
}

pub fn separator() -> &'static str {
    "---"
}

/// Writes a turn's progress to a terminal (or any writer)
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
    after_tools: bool,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            after_tools: false,
        }
    }

    pub fn prompt(&mut self, input: &str) {
        self.after_tools = false;
        self.emit(format!("{}", prompt_line(input).cyan()));
    }

    pub fn error(&mut self, message: &str) {
        self.emit(format!("{}", message.red()));
    }

    pub fn separator(&mut self) {
        self.emit(format!("{}\n", separator().dim()));
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: String) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "Terminal write failed");
        }
    }
}

impl<W: Write + Send> TurnObserver for TerminalPresenter<W> {
    fn on_model_reply(&mut self, message: &Message) {
        if self.after_tools {
            self.emit(String::new());
            self.after_tools = false;
        }

        if let Some(line) = message.thinking.as_deref().and_then(thinking_line) {
            self.emit(format!("{}", line.dim()));
        }

        let content = message.content.trim();
        if !content.is_empty() {
            self.emit(content.to_string());
        }
    }

    fn on_tool_call(&mut self, call: &ToolCall) {
        if !self.after_tools {
            self.emit(String::new());
        }
        self.after_tools = true;

        self.emit(format!(
            "{}{}({})",
            "◇ ".cyan(),
            call.name.as_str().magenta(),
            tool_call_args(call)
        ));
    }

    fn on_tool_result(&mut self, _call: &ToolCall, result: &ToolResult) {
        for (ok, line) in tool_result_lines(result) {
            let styled = if ok { line.green() } else { line.yellow() };
            self.emit(format!("{}", styled));
        }
    }
}
