//! Shared fixtures for scenario and property tests.

use std::sync::Arc;

use stakepool_core::constants::{DEFAULT_PREMINT, DEFAULT_REWARD_RATE};
use stakepool_core::traits::{Clock, TokenGateway};
use stakepool_core::types::{Address, Amount, Lot, Timestamp};
use stakepool_engine::{Deployment, ManualClock, PoolConfig, StakingEngine};

/// Funding amount used by the reference scenarios.
pub const P: Amount = DEFAULT_PREMINT;
pub const RATE: Amount = DEFAULT_REWARD_RATE;
/// Deployment time of every fixture pool.
pub const T0: Timestamp = 1_700_000_000;
/// Opening stake-token balance of every fixture staker.
pub const STAKER_BALANCE: Amount = 1_000_000_000;

pub fn addr(seed: u8) -> Address {
    Address::repeat(seed)
}

pub fn deployer() -> Address {
    addr(0xD0)
}

/// Closed-form reward of one constant-total segment.
pub fn segment(amount: Amount, secs: u64, total: Amount) -> Amount {
    amount * RATE * Amount::from(secs) / total
}

/// A deployed pool driven by a manual clock.
pub struct Pool {
    pub deployment: Deployment,
    pub clock: Arc<ManualClock>,
}

impl Pool {
    /// Deployed with the default config, not yet funded.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let deployment = Deployment::deploy(&PoolConfig::default(), deployer(), clock.clone())
            .expect("default config deploys");
        Self { deployment, clock }
    }

    /// Deployed and funded with `P` at `T0`.
    pub fn funded() -> Self {
        let mut pool = Self::new();
        pool.deployment.fund(P).expect("first funding succeeds");
        pool
    }

    pub fn engine(&self) -> &StakingEngine {
        &self.deployment.engine
    }

    pub fn engine_mut(&mut self) -> &mut StakingEngine {
        &mut self.deployment.engine
    }

    /// Give `who` an opening balance and an unlimited allowance for the engine.
    pub fn onboard(&self, who: &Address) {
        self.deployment.airdrop(who, STAKER_BALANCE).expect("airdrop fits supply");
        self.deployment.approve(who, Amount::MAX);
    }

    pub fn stake(&mut self, who: &Address, amount: Amount) {
        self.engine_mut().stake(who, amount).expect("stake succeeds");
    }

    pub fn advance(&self, secs: u64) -> Timestamp {
        self.clock.advance(secs)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn lots(&self, who: &Address) -> Vec<Lot> {
        (0..self.engine().lot_count(who))
            .map(|i| self.engine().lot_at(who, i).expect("index in range"))
            .collect()
    }

    pub fn stake_balance(&self, who: &Address) -> Amount {
        self.deployment.stake_token.balance_of(who)
    }

    pub fn reward_balance(&self, who: &Address) -> Amount {
        self.deployment.reward_token.balance_of(who)
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
