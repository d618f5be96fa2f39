//! Prober
//!
//! Probes a list of hosts one after another. Every host gets exactly one
//! outcome, in input order; a failing host never affects the others.

use std::sync::Arc;

use crate::error::{ProbeError, Result};
use crate::model::{PingStats, ProbeOutcome};
use crate::parse::parse_summary;
use crate::runner::PingRunner;

/// Echo requests sent per host unless configured otherwise
pub const DEFAULT_COUNT: u32 = 5;

pub struct Prober {
    runner: Arc<dyn PingRunner>,
    count: u32,
}

impl Prober {
    pub fn new(runner: Arc<dyn PingRunner>) -> Self {
        Self {
            runner,
            count: DEFAULT_COUNT,
        }
    }

    /// Echo requests per host (at least 1)
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Probe every host in order
    pub async fn probe(&self, hosts: &[String]) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(hosts.len());
        for host in hosts {
            outcomes.push(self.probe_host(host).await);
        }
        outcomes
    }

    /// Probe a single host; errors become a failure outcome
    pub async fn probe_host(&self, host: &str) -> ProbeOutcome {
        match self.try_probe(host).await {
            Ok(stats) => {
                tracing::debug!(
                    %host,
                    rtt_avg = stats.rtt_avg,
                    packet_loss = stats.packet_loss,
                    "Probe succeeded"
                );
                ProbeOutcome::Success(stats)
            }
            Err(e) => {
                tracing::warn!(%host, runner = self.runner.name(), error = %e, "Probe failed");
                let mut error = e.to_string();
                if error.trim().is_empty() {
                    error = format!("{} produced no output for {}", self.runner.name(), host);
                }
                ProbeOutcome::failure(host, error)
            }
        }
    }

    async fn try_probe(&self, host: &str) -> Result<PingStats> {
        validate_host(host)?;
        let output = self.runner.run(host, self.count).await?;
        parse_summary(host, &output)
    }
}

/// Reject hosts that `ping` would read as an option or that are blank
fn validate_host(host: &str) -> Result<()> {
    if host.trim().is_empty() || host.starts_with('-') || host.chars().any(char::is_whitespace) {
        return Err(ProbeError::InvalidHost(host.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StaticPingRunner;
    use pretty_assertions::assert_eq;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| (*h).to_string()).collect()
    }

    #[tokio::test]
    async fn test_reachable_host() {
        let prober = Prober::new(Arc::new(StaticPingRunner::new().reachable("8.8.8.8", 9.4, 9.8, 10.2)));

        let outcomes = prober.probe(&hosts(&["8.8.8.8"])).await;

        assert_eq!(outcomes.len(), 1);
        let ProbeOutcome::Success(stats) = &outcomes[0] else {
            panic!("expected success, got {:?}", outcomes[0]);
        };
        assert!(0.0 <= stats.rtt_min && stats.rtt_min <= stats.rtt_avg && stats.rtt_avg <= stats.rtt_max);
        assert_eq!(stats.packet_loss, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_host_is_failure() {
        let prober = Prober::new(Arc::new(StaticPingRunner::new()));

        let outcomes = prober.probe(&hosts(&["256.256.256.256"])).await;

        assert_eq!(outcomes.len(), 1);
        let ProbeOutcome::Failure(failure) = &outcomes[0] else {
            panic!("expected failure");
        };
        assert_eq!(failure.host, "256.256.256.256");
        assert!(!failure.error.is_empty());
    }

    #[tokio::test]
    async fn test_order_preserved_across_mixed_results() {
        let runner = Arc::new(
            StaticPingRunner::new()
                .reachable("a.example", 1.0, 2.0, 3.0)
                .spawn_failure("b.example")
                .reachable("d.example", 4.0, 5.0, 6.0),
        );
        let prober = Prober::new(runner.clone());
        let input = hosts(&["a.example", "b.example", "c.example", "d.example", "-f"]);

        let outcomes = prober.probe(&input).await;

        let got: Vec<(&str, bool)> = outcomes.iter().map(|o| (o.host(), o.is_success())).collect();
        assert_eq!(
            got,
            vec![
                ("a.example", true),
                ("b.example", false),
                ("c.example", false),
                ("d.example", true),
                ("-f", false),
            ]
        );
        // the option-looking host never reaches the runner
        assert_eq!(runner.calls(), vec!["a.example", "b.example", "c.example", "d.example"]);
    }

    #[tokio::test]
    async fn test_empty_output_gets_message() {
        let prober = Prober::new(Arc::new(StaticPingRunner::new().with_output("quiet", "")));

        let outcome = prober.probe_host("quiet").await;
        let ProbeOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.error.contains("no output"));
    }

    #[test]
    fn test_count_floor() {
        let prober = Prober::new(Arc::new(StaticPingRunner::new())).with_count(0);
        assert_eq!(prober.count(), 1);
    }
}
