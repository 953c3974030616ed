//! Lifecycle notifications recorded by the staking engine.

use serde::Serialize;

use stakepool_core::types::{Address, Amount, Timestamp};

/// Something observable that happened to the pool.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StakingEvent {
    /// The pool was seeded by its owner.
    Funded { funder: Address, amount: Amount, timestamp: Timestamp },
    /// A new lot was deposited.
    Staked { owner: Address, amount: Amount, timestamp: Timestamp },
    /// Stake was returned to its owner, with the rewards of the visited lots.
    Withdrawn { owner: Address, amount: Amount, reward: Amount, timestamp: Timestamp },
    /// Rewards of every lot were paid out.
    RewardsClaimed { owner: Address, reward: Amount, timestamp: Timestamp },
}

impl StakingEvent {
    /// The account the event concerns.
    pub fn account(&self) -> &Address {
        match self {
            Self::Funded { funder, .. } => funder,
            Self::Staked { owner, .. }
            | Self::Withdrawn { owner, .. }
            | Self::RewardsClaimed { owner, .. } => owner,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Funded { timestamp, .. }
            | Self::Staked { timestamp, .. }
            | Self::Withdrawn { timestamp, .. }
            | Self::RewardsClaimed { timestamp, .. } => *timestamp,
        }
    }
}
