//! Error Types for Probing

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Ping timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// Output without a recognizable summary; carries the raw output
    #[error("{0}")]
    Unparsed(String),
}
