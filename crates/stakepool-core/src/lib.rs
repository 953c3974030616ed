//! # stakepool-core
//! Foundation types, traits and pure ledger math for the stakepool engine.
//!
//! All reward arithmetic is integer-only (`u128`, floor division) so every
//! accrual is reproducible:
//! - [`checkpoint::PoolCheckpointLog`]: append-only pool-size timeline
//! - [`ledger::StakeLedger`]: per-owner deposit lots, zeroed in place
//! - [`accrual::RewardAccrual`]: segmented, pool-proportional reward integral

pub mod accrual;
pub mod checkpoint;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod types;

pub use accrual::RewardAccrual;
pub use checkpoint::PoolCheckpointLog;
pub use ledger::StakeLedger;
