//! System `ping` runner

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::PingRunner;
use crate::error::{ProbeError, Result};

/// Runs the platform `ping` executable as `ping -c <count> <host>`
#[derive(Clone, Debug)]
pub struct SystemPingRunner {
    program: String,
    timeout: Option<Duration>,
}

impl Default for SystemPingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPingRunner {
    pub fn new() -> Self {
        Self {
            program: "ping".into(),
            timeout: None,
        }
    }

    /// Use a different executable (e.g. an absolute path)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill the process if it runs longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PingRunner for SystemPingRunner {
    async fn run(&self, host: &str, count: u32) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg(count.to_string())
            .arg(host)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| ProbeError::Timeout(limit))?,
            None => command.output().await,
        }
        .map_err(|source| ProbeError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        tracing::trace!(%host, status = %output.status, "ping exited");

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
