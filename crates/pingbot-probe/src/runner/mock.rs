//! Static Ping Runner
//!
//! For testing and demo purposes. Returns canned output per host and records
//! the order in which hosts were probed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::PingRunner;
use crate::error::{ProbeError, Result};

/// Canned ping runner
#[derive(Default)]
pub struct StaticPingRunner {
    outputs: HashMap<String, String>,
    spawn_failures: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl StaticPingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `host` with iputils-style output for the given round trips
    pub fn reachable(mut self, host: &str, rtt_min: f64, rtt_avg: f64, rtt_max: f64) -> Self {
        let output = format!(
            "PING {host} ({host}) 56(84) bytes of data.\n\
             \n\
             --- {host} ping statistics ---\n\
             5 packets transmitted, 5 received, 0% packet loss, time 4005ms\n\
             rtt min/avg/max/mdev = {rtt_min:.3}/{rtt_avg:.3}/{rtt_max:.3}/0.250 ms\n"
        );
        self.outputs.insert(host.to_string(), output);
        self
    }

    /// Answer `host` with arbitrary output
    pub fn with_output(mut self, host: &str, output: impl Into<String>) -> Self {
        self.outputs.insert(host.to_string(), output.into());
        self
    }

    /// Fail to spawn for `host`
    pub fn spawn_failure(mut self, host: &str) -> Self {
        self.spawn_failures.push(host.to_string());
        self
    }

    /// Hosts probed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PingRunner for StaticPingRunner {
    async fn run(&self, host: &str, _count: u32) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(host.to_string());
        }

        if self.spawn_failures.iter().any(|h| h == host) {
            return Err(ProbeError::Spawn {
                program: "ping".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "operation not permitted"),
            });
        }

        // Unknown hosts look like a resolver failure
        Ok(self
            .outputs
            .get(host)
            .cloned()
            .unwrap_or_else(|| format!("ping: {host}: Name or service not known\n")))
    }

    fn name(&self) -> &str {
        "StaticPing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_runner() {
        let runner = StaticPingRunner::new().reachable("8.8.8.8", 1.0, 2.0, 3.0);

        let output = runner.run("8.8.8.8", 5).await.unwrap();
        assert!(output.contains("rtt min/avg/max/mdev = 1.000/2.000/3.000/0.250 ms"));

        let unknown = runner.run("nowhere.invalid", 5).await.unwrap();
        assert!(unknown.contains("Name or service not known"));

        assert_eq!(runner.calls(), vec!["8.8.8.8", "nowhere.invalid"]);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = StaticPingRunner::new().spawn_failure("blocked");
        assert!(matches!(runner.run("blocked", 5).await, Err(ProbeError::Spawn { .. })));
    }
}
