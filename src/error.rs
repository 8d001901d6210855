//! Error types for the few fallible entry points (configuration and
//! mission metadata). Gameplay actions never fail; they are no-ops.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[source] serde_json::Error),

    #[error("mission intel parse error: {0}")]
    MissionIntel(#[source] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
