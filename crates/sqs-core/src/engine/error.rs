use thiserror::Error;

use super::config::ConfigError;
use crate::core::rank::RankError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid histogram: {0}")]
    InvalidHistogram(String),

    #[error("Invalid pair list entry {index}: {reason}")]
    InvalidPairList { index: usize, reason: String },

    #[error("Invalid iteration mode: {0}")]
    InvalidMode(String),

    #[error("Rank arithmetic failed: {source}")]
    Rank {
        #[from]
        source: RankError,
    },

    #[error("Settings error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
