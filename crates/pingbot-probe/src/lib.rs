//! # pingbot-probe
//!
//! Network reachability probing through the system `ping` utility.
//!
//! ## Flow
//!
//! ```text
//! hosts ──▶ Prober ──▶ PingRunner (`ping -c 5 <host>`) ──▶ parse_summary
//!                                                              │
//!           Vec<ProbeOutcome> ◀── Success(PingStats) | Failure ┘
//! ```
//!
//! Hosts are probed one after another and results keep the input order.
//! Parsing is best effort: output without a recognizable summary line is
//! reported as a failure carrying the raw text.

pub mod error;
pub mod model;
pub mod parse;
pub mod probe;
pub mod runner;
pub mod svckit;

pub use error::{ProbeError, Result};
pub use model::{PingStats, ProbeOutcome};
pub use probe::{DEFAULT_COUNT, Prober};
pub use runner::{PingRunner, StaticPingRunner, SystemPingRunner};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::PingTool;
}

/// System prompt seeded into every conversation
pub const SYSTEM_PROMPT: &str = "Present findings concisely. Use brief bullet points or sections. \
No markdown formatting unless requested.";
