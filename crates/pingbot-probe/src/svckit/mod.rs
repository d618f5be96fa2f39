//! Service Kit - Agent Tools
//!
//! Tools that implement `pingbot_core::Tool` on top of the prober.

mod ping;

pub use ping::PingTool;
