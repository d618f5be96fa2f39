//! Probe Results

use pingbot_core::TargetFailure;
use serde::{Deserialize, Serialize};

/// Round-trip statistics for one reachable host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    pub host: String,

    /// Round-trip times in milliseconds
    pub rtt_min: f64,
    pub rtt_avg: f64,
    pub rtt_max: f64,

    /// Lost echo requests, in percent
    pub packet_loss: f64,
}

/// Result of probing one host.
///
/// Serialized flat, so a success reads
/// `{"host":…,"rtt_min":…,"rtt_avg":…,"rtt_max":…,"packet_loss":…}` and a
/// failure reads `{"host":…,"error":…}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeOutcome {
    Success(PingStats),
    Failure(TargetFailure),
}

impl ProbeOutcome {
    pub fn failure(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failure(TargetFailure::new(host, error))
    }

    pub fn host(&self) -> &str {
        match self {
            Self::Success(stats) => &stats.host,
            Self::Failure(failure) => &failure.host,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<ProbeOutcome> {
        vec![
            ProbeOutcome::Success(PingStats {
                host: "8.8.8.8".into(),
                rtt_min: 9.412,
                rtt_avg: 9.823,
                rtt_max: 10.201,
                packet_loss: 0.0,
            }),
            ProbeOutcome::failure("256.256.256.256", "ping: 256.256.256.256: Name or service not known"),
            ProbeOutcome::Success(PingStats {
                host: "1.1.1.1".into(),
                rtt_min: 3.0,
                rtt_avg: 4.5,
                rtt_max: 6.25,
                packet_loss: 20.0,
            }),
        ]
    }

    #[test]
    fn test_outcomes_survive_json() {
        let outcomes = sample();
        let json = serde_json::to_string(&outcomes).unwrap();
        let back: Vec<ProbeOutcome> = serde_json::from_str(&json).unwrap();

        assert_eq!(back, outcomes);
    }

    #[test]
    fn test_flat_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json[0]["host"], "8.8.8.8");
        assert_eq!(json[0]["rtt_avg"], 9.823);
        assert!(json[0].get("error").is_none());
        assert_eq!(json[1]["error"], "ping: 256.256.256.256: Name or service not known");
        assert!(json[1].get("rtt_min").is_none());
    }

    #[test]
    fn test_accessors() {
        let outcomes = sample();
        let hosts: Vec<&str> = outcomes.iter().map(ProbeOutcome::host).collect();
        assert_eq!(hosts, vec!["8.8.8.8", "256.256.256.256", "1.1.1.1"]);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
    }
}
