//! Pool deployment.
//!
//! Brings up a complete pool in one call:
//!
//! 1. the stake token, with `premint` credited to the deployer;
//! 2. the reward token, mintable only by the engine;
//! 3. the engine, owned by the deployer, with both tokens attached.
//!
//! The engine's address is derived from the deployer before the reward
//! token is created, so the token can name it as minter.

use std::sync::Arc;

use tracing::info;

use stakepool_core::traits::Clock;
use stakepool_core::types::{Address, Amount};

use crate::config::PoolConfig;
use crate::engine::StakingEngine;
use crate::error::DeployError;
use crate::token::MemoryToken;

pub const STAKE_SYMBOL: &str = "STK";
pub const REWARD_SYMBOL: &str = "RWD";

/// Nonce the engine address is derived with.
const ENGINE_NONCE: u64 = 0;

#[derive(Debug)]
pub struct Deployment {
    pub deployer: Address,
    pub stake_token: Arc<MemoryToken>,
    pub reward_token: Arc<MemoryToken>,
    pub engine: StakingEngine,
}

impl Deployment {
    pub fn deploy(
        config: &PoolConfig,
        deployer: Address,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DeployError> {
        config.validate()?;

        let engine_address = deployer.derive(ENGINE_NONCE);
        let stake_token = Arc::new(MemoryToken::with_premint(STAKE_SYMBOL, &deployer, config.premint()));
        let reward_token = Arc::new(MemoryToken::mintable(REWARD_SYMBOL, &engine_address));

        let mut engine = StakingEngine::new(engine_address, deployer, config.reward_rate(), clock);
        engine.set_staking_token(&deployer, stake_token.clone())?;
        engine.set_reward_token(&deployer, reward_token.clone())?;

        info!(
            deployer = %deployer,
            engine = %engine_address,
            reward_rate = config.reward_rate,
            premint = config.premint,
            "pool deployed"
        );
        Ok(Self { deployer, stake_token, reward_token, engine })
    }

    pub fn engine_address(&self) -> Address {
        *self.engine.address()
    }

    /// Approve the engine for `amount` of the deployer's stake tokens and
    /// seed the pool with them.
    pub fn fund(&mut self, amount: Amount) -> Result<(), DeployError> {
        let engine = self.engine_address();
        self.stake_token.approve(&self.deployer, &engine, amount);
        self.engine.initial_fund(&self.deployer, amount)?;
        Ok(())
    }

    /// Set `holder`'s stake-token allowance for the engine.
    pub fn approve(&self, holder: &Address, amount: Amount) {
        self.stake_token.approve(holder, &self.engine_address(), amount);
    }

    /// Issue `amount` fresh stake tokens to `holder`.
    pub fn airdrop(&self, holder: &Address, amount: Amount) -> Result<(), DeployError> {
        self.stake_token.issue(holder, amount)?;
        Ok(())
    }

    /// Approve exactly `amount` and stake it.
    pub fn approve_and_stake(&mut self, holder: &Address, amount: Amount) -> Result<(), DeployError> {
        self.approve(holder, amount);
        self.engine.stake(holder, amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use stakepool_core::error::{StakingError, TokenError};
    use stakepool_core::traits::{RewardToken, TokenGateway};

    fn deployer() -> Address {
        Address::repeat(0xD0)
    }

    fn small_config() -> PoolConfig {
        PoolConfig { reward_rate: 100, premint: 1_000, ..PoolConfig::default() }
    }

    fn deploy() -> (Deployment, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(50));
        let d = Deployment::deploy(&small_config(), deployer(), clock.clone()).unwrap();
        (d, clock)
    }

    #[test]
    fn wires_tokens_and_engine() {
        let (d, _) = deploy();
        assert_eq!(d.stake_token.balance_of(&deployer()), 1_000);
        assert_eq!(d.reward_token.minter(), Some(d.engine_address()));
        assert_eq!(d.engine_address(), deployer().derive(0));
        assert_eq!(d.engine.owner(), &deployer());
        assert_eq!(d.engine.reward_rate(), 100);
        assert!(!d.engine.is_funded());
    }

    #[test]
    fn deployer_cannot_mint_rewards() {
        let (d, _) = deploy();
        let err = d.reward_token.mint(&deployer(), &deployer(), 1).unwrap_err();
        assert_eq!(err, TokenError::Unauthorized(deployer()));
    }

    #[test]
    fn fund_then_stake() {
        let (mut d, clock) = deploy();
        d.fund(1_000).unwrap();
        assert!(d.engine.is_funded());
        assert_eq!(d.stake_token.balance_of(&d.engine_address()), 1_000);

        let alice = Address::repeat(0xA1);
        d.airdrop(&alice, 300).unwrap();
        clock.advance(1);
        d.approve_and_stake(&alice, 200).unwrap();
        assert_eq!(d.engine.staked_balance(&alice).unwrap(), 200);
        assert_eq!(d.stake_token.balance_of(&alice), 100);
    }

    #[test]
    fn fund_twice_rejected() {
        let (mut d, _) = deploy();
        d.fund(500).unwrap();
        let err = d.fund(500).unwrap_err();
        assert_eq!(err, DeployError::Staking(StakingError::AlreadyFunded));
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = PoolConfig { reward_rate: 0, ..PoolConfig::default() };
        let err = Deployment::deploy(&cfg, deployer(), Arc::new(ManualClock::new(0))).unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
    }
}
