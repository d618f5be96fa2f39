//! Ping Output Parsing
//!
//! Best-effort scraping of the summary printed by common `ping`
//! implementations:
//!
//! ```text
//! rtt min/avg/max/mdev = 9.412/9.823/10.201/0.289 ms          (iputils)
//! round-trip min/avg/max/stddev = 14.125/16.042/18.311/1.503 ms (BSD, macOS)
//! round-trip min/avg/max = 1.021/2.334/3.875 ms                 (busybox)
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ProbeError, Result};
use crate::model::PingStats;

static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:round-trip|rtt)[^=\n]*=\s*([\d.]+)/([\d.]+)/([\d.]+)")
        .expect("summary pattern is valid")
});

static PACKET_LOSS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d.]+)%\s+packet loss").expect("packet loss pattern is valid")
});

/// Extract round-trip statistics and packet loss from raw ping output.
///
/// Anything unrecognized is returned as [`ProbeError::Unparsed`] carrying the
/// output itself.
pub fn parse_summary(host: &str, output: &str) -> Result<PingStats> {
    let unparsed = || ProbeError::Unparsed(output.trim().to_string());

    let caps = SUMMARY.captures(output).ok_or_else(unparsed)?;
    let field = |i: usize| -> Result<f64> {
        caps[i].parse::<f64>().map_err(|_| unparsed())
    };

    let rtt_min = field(1)?;
    let rtt_avg = field(2)?;
    let rtt_max = field(3)?;
    let packet_loss = parse_packet_loss(output).ok_or_else(unparsed)?;

    Ok(PingStats {
        host: host.to_string(),
        rtt_min,
        rtt_avg,
        rtt_max,
        packet_loss,
    })
}

/// Packet loss in percent.
///
/// Prefers the `N% packet loss` figure. Output that lacks it falls back to
/// the older rule: `0.0` when the text contains `0%` anywhere, otherwise the
/// token right before the first `%`.
pub fn parse_packet_loss(output: &str) -> Option<f64> {
    if let Some(caps) = PACKET_LOSS.captures(output) {
        if let Ok(loss) = caps[1].parse() {
            return Some(loss);
        }
    }

    if output.contains("0%") {
        return Some(0.0);
    }

    output
        .split('%')
        .next()
        .filter(|head| head.len() < output.len())
        .and_then(|head| head.split_whitespace().last())
        .and_then(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINUX: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=9.87 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=9.41 ms
64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=10.2 ms
64 bytes from 8.8.8.8: icmp_seq=4 ttl=117 time=9.81 ms
64 bytes from 8.8.8.8: icmp_seq=5 ttl=117 time=9.82 ms

--- 8.8.8.8 ping statistics ---
5 packets transmitted, 5 received, 0% packet loss, time 4006ms
rtt min/avg/max/mdev = 9.412/9.823/10.201/0.289 ms
";

    const MACOS: &str = "\
PING 8.8.8.8 (8.8.8.8): 56 data bytes
64 bytes from 8.8.8.8: icmp_seq=0 ttl=117 time=14.125 ms

--- 8.8.8.8 ping statistics ---
5 packets transmitted, 5 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 14.125/16.042/18.311/1.503 ms
";

    const LOSSY: &str = "\
--- 10.0.0.1 ping statistics ---
5 packets transmitted, 4 received, 20% packet loss, time 4005ms
rtt min/avg/max/mdev = 1.100/1.500/2.250/0.400 ms
";

    #[test]
    fn test_linux_summary() {
        let stats = parse_summary("8.8.8.8", LINUX).unwrap();
        assert_eq!(
            stats,
            PingStats {
                host: "8.8.8.8".into(),
                rtt_min: 9.412,
                rtt_avg: 9.823,
                rtt_max: 10.201,
                packet_loss: 0.0,
            }
        );
    }

    #[test]
    fn test_macos_summary() {
        let stats = parse_summary("8.8.8.8", MACOS).unwrap();
        assert_eq!(stats.rtt_min, 14.125);
        assert_eq!(stats.rtt_avg, 16.042);
        assert_eq!(stats.rtt_max, 18.311);
        assert_eq!(stats.packet_loss, 0.0);
        assert!(0.0 <= stats.rtt_min && stats.rtt_min <= stats.rtt_avg && stats.rtt_avg <= stats.rtt_max);
    }

    #[test]
    fn test_partial_loss() {
        let stats = parse_summary("10.0.0.1", LOSSY).unwrap();
        assert_eq!(stats.packet_loss, 20.0);
    }

    #[test]
    fn test_busybox_summary() {
        let output = "5 packets transmitted, 5 packets received, 0% packet loss\nround-trip min/avg/max = 1.021/2.334/3.875 ms\n";
        let stats = parse_summary("router", output).unwrap();
        assert_eq!(stats.rtt_max, 3.875);
    }

    #[test]
    fn test_unresolvable_host_keeps_raw_output() {
        let output = "ping: 256.256.256.256: Name or service not known\n";
        let err = parse_summary("256.256.256.256", output).unwrap_err();

        assert!(matches!(&err, ProbeError::Unparsed(_)));
        assert_eq!(err.to_string(), "ping: 256.256.256.256: Name or service not known");
    }

    #[test]
    fn test_total_loss_has_no_summary() {
        let output = "--- 10.255.255.1 ping statistics ---\n5 packets transmitted, 0 received, 100% packet loss, time 4099ms\n";
        assert!(parse_summary("10.255.255.1", output).is_err());
    }

    #[test]
    fn test_loss_fallbacks() {
        assert_eq!(parse_packet_loss("3.5% lost"), Some(3.5));
        assert_eq!(parse_packet_loss("lost 0% of them"), Some(0.0));
        assert_eq!(parse_packet_loss("no percentage here"), None);
    }
}
