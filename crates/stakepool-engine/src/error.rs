//! Error types for configuration and deployment.
use thiserror::Error;

use stakepool_core::error::{StakingError, TokenError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")] Load(String),
    #[error("reward_rate must be greater than zero")] ZeroRewardRate,
    #[error("premint must be greater than zero")] ZeroPremint,
    #[error("unknown log format {0:?}, expected \"text\" or \"json\"")] UnknownLogFormat(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        Self::Load(e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Staking(#[from] StakingError),
    #[error(transparent)] Token(#[from] TokenError),
}
