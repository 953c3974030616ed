//! # stakepool-engine: Staking engine and its environment.
//!
//! Composes the pure ledger structures of `stakepool-core` into a running pool:
//! - [`engine::StakingEngine`]: stake / withdraw / claim state machine
//! - [`funding::FundingGate`]: one-time pool seeding
//! - [`token::MemoryToken`]: in-memory fungible token service
//! - [`clock`]: wall and manual clocks
//! - [`events::StakingEvent`]: lifecycle notifications
//! - [`config::PoolConfig`]: pool configuration
//! - [`deploy::Deployment`]: tokens + engine wired together

pub mod clock;
pub mod config;
pub mod deploy;
pub mod engine;
pub mod error;
pub mod events;
pub mod funding;
pub mod token;

pub use clock::{ManualClock, SystemClock};
pub use config::PoolConfig;
pub use deploy::Deployment;
pub use engine::{LotPayout, StakingEngine, Withdrawal};
pub use error::{ConfigError, DeployError};
pub use events::StakingEvent;
pub use token::MemoryToken;
