//! Ping Runners
//!
//! Abstractions over how a single ping is executed.

mod mock;
mod system;

pub use mock::StaticPingRunner;
pub use system::SystemPingRunner;

use async_trait::async_trait;

use crate::error::Result;

/// Runs one ping and returns its combined stdout/stderr text (Strategy pattern)
///
/// Implement this to probe through something other than the local `ping`
/// binary.
#[async_trait]
pub trait PingRunner: Send + Sync {
    /// Send `count` echo requests to `host`
    async fn run(&self, host: &str, count: u32) -> Result<String>;

    /// Runner name, for logs
    fn name(&self) -> &str;
}
